//! Demo page and stylesheet rendering.

use crate::glyphs::{GlyphMap, utf_code};

pub const NUMBER_OF_GLYPHS_PLACEHOLDER: &str = "{{ NUMBER_OF_GLYPHS }}";
pub const GLYPH_LIST_PLACEHOLDER: &str = "{{ GLYPH_LIST }}";
pub const STYLE_LIST_PLACEHOLDER: &str = "{{ STYLE_LIST }}";

fn demo_block(glyph_name: &str, utf_code: &str) -> String {
    format!(
        r#"
      <div class="glyph fs1">
        <div class="clearfix bshadow0 pbs">
          <span class="icon-{glyph_name}"></span>
          <span class="mls"> icon-{glyph_name}</span>
        </div>
        <fieldset class="fs0 size1of1 clearfix hidden-false">
          <input type="text" readonly value="{utf_code}" class="unit size1of2" />
          <input
            type="text"
            maxlength="1"
            readonly
            value="&#x{utf_code};"
            class="unitRight size1of2 talign-right"
          />
        </fieldset>
        <div class="fs0 bshadow0 clearfix hidden-true">
          <span class="unit pvs fgc1">liga: </span>
          <input type="text" readonly value="" class="liga unitRight" />
        </div>
      </div>
"#
    )
}

fn style_rule(glyph_name: &str, utf_code: &str) -> String {
    format!("\n.icon-{glyph_name}:before {{\n  content: \"\\{utf_code}\";\n}}\n")
}

/// Fill the demo page template with one block per glyph.
pub fn render_demo_html(template: &str, glyphs: &GlyphMap) -> String {
    let blocks: Vec<String> =
        glyphs.iter().map(|(cp, glyph)| demo_block(&glyph.name, &utf_code(cp))).collect();
    template
        .replace(NUMBER_OF_GLYPHS_PLACEHOLDER, &glyphs.len().to_string())
        .replace(GLYPH_LIST_PLACEHOLDER, &blocks.join("\n"))
}

/// Fill the stylesheet template with one `:before` rule per glyph.
pub fn render_style_css(template: &str, glyphs: &GlyphMap) -> String {
    let rules: Vec<String> =
        glyphs.iter().map(|(cp, glyph)| style_rule(&glyph.name, &utf_code(cp))).collect();
    template.replace(STYLE_LIST_PLACEHOLDER, &rules.join("\n"))
}
