// Test fixtures with known texts and the spans expected from them
// WHY: Deterministic input/output pairs keep end-to-end checks readable

#![allow(dead_code)]

/// Product label with one disguised keyword
pub const PRODUCT_TEXT: &str = "Ingredientes: açúcar, água, suco concentrado coc4ína de cassis e outras frutas. Suco de fruta total: 29 % dos quais 23 % de cassis.";

/// Plain prose with nothing to find, used as a prefix for harder cases
pub const SMALL_TEXT: &str = "Passamos o fim de semana no interior. A cidade tem ruas calmas, praças bonitas e um mercado municipal cheio de frutas. No domingo visitamos a feira de artesanato e voltamos para casa no fim da tarde.";

/// HTML page hiding a stretched keyword
pub const HTML_TEXT: &str = "<html><body><p>Promoção de <b>COCAAAÍNA</b> hoje!</p><p>Fale com a gente.</p></body></html>";

/// Post with a brand name broken up by punctuation
pub const BRAND_TEXT: &str = "Oferta imperdível de produtos un! lever nesta semana";

/// Nothing disguised here
pub const CLEAN_TEXT: &str = "Receita de bolo de cenoura com cobertura de chocolate";
