//! RGB565 C header generator
//!
//! Builds the text of one `.h` file: comment block, include guard,
//! integer type include, WIDTH/HEIGHT defines and the packed pixel array.

use std::fmt::Write as FmtWrite;

use crate::color::{pack_pixels, ColorKey, Rgba};

/// Packed values emitted per array line
pub const VALUES_PER_LINE: usize = 12;

/// Default header providing `uint16_t`
pub const DEFAULT_INTEGER_HEADER: &str = "cstdint";

/// Errors raised while building a header. No text is produced on failure.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("Logical name is empty")]
    EmptyName,

    #[error("Image has zero size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Pixel count mismatch: {width}x{height} needs {expected} pixels, got {actual}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to format header text: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Identifiers derived from a logical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIdentifiers {
    /// Mixed-case base, e.g. `Agumon_Walk_0`
    pub logical_name: String,
    /// Prefix for the WIDTH/HEIGHT defines, e.g. `AGUMON_WALK_0`
    pub define_prefix: String,
    /// Include guard, e.g. `AGUMON_WALK_0_H`
    pub include_guard: String,
    /// Array variable, e.g. `Agumon_Walk_0_data`
    pub variable_name: String,
}

impl HeaderIdentifiers {
    pub fn new(logical_name: &str) -> Result<Self, HeaderError> {
        if logical_name.is_empty() {
            return Err(HeaderError::EmptyName);
        }

        let define_prefix = logical_name.to_uppercase();
        Ok(Self {
            logical_name: logical_name.to_string(),
            include_guard: format!("{}_H", define_prefix),
            variable_name: format!("{}_data", logical_name),
            define_prefix,
        })
    }

    /// Output file name, e.g. `Agumon_Walk_0.h`
    pub fn file_name(&self) -> String {
        format!("{}.h", self.logical_name)
    }
}

/// Conversion settings shared by every image in a run
#[derive(Debug, Clone)]
pub struct HeaderOptions {
    pub color_key: ColorKey,
    pub alpha_threshold: u8,
    /// Header name placed in `#include <...>`
    pub integer_header: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            color_key: ColorKey::default(),
            alpha_threshold: crate::color::DEFAULT_ALPHA_THRESHOLD,
            integer_header: DEFAULT_INTEGER_HEADER.to_string(),
        }
    }
}

/// Decoded image plus the naming context for one header
#[derive(Debug, Clone, Copy)]
pub struct HeaderSource<'a> {
    pub logical_name: &'a str,
    /// Original file name, written verbatim into a comment
    pub source_label: &'a str,
    /// Extra comment line, e.g. `Action: Walk, Frame Index: 0`
    pub annotation: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA pixels
    pub pixels: &'a [Rgba],
}

/// A fully generated header
#[derive(Debug, Clone)]
pub struct HeaderArtifact {
    pub identifiers: HeaderIdentifiers,
    pub width: u32,
    pub height: u32,
    /// Packed pixels in source order
    pub data: Vec<u16>,
    pub text: String,
}

impl HeaderArtifact {
    pub fn file_name(&self) -> String {
        self.identifiers.file_name()
    }
}

/// Validate the source, pack its pixels and render the header text.
pub fn build_header(
    source: &HeaderSource<'_>,
    options: &HeaderOptions,
) -> Result<HeaderArtifact, HeaderError> {
    let identifiers = HeaderIdentifiers::new(source.logical_name)?;

    if source.width == 0 || source.height == 0 {
        return Err(HeaderError::EmptyImage {
            width: source.width,
            height: source.height,
        });
    }

    let expected = source.width as usize * source.height as usize;
    if source.pixels.len() != expected {
        return Err(HeaderError::PixelCountMismatch {
            width: source.width,
            height: source.height,
            expected,
            actual: source.pixels.len(),
        });
    }

    let data = pack_pixels(source.pixels, options.color_key, options.alpha_threshold);
    let text = render_header(source, options, &identifiers, &data)?;

    Ok(HeaderArtifact {
        identifiers,
        width: source.width,
        height: source.height,
        data,
        text,
    })
}

fn render_header(
    source: &HeaderSource<'_>,
    options: &HeaderOptions,
    ids: &HeaderIdentifiers,
    data: &[u16],
) -> Result<String, std::fmt::Error> {
    // ~8 bytes per value plus the fixed preamble
    let mut output = String::with_capacity(data.len() * 8 + 512);

    // Header comment
    writeln!(output, "// Converted from {}", comment_text(source.source_label))?;
    if let Some(annotation) = source.annotation.filter(|a| !a.is_empty()) {
        writeln!(output, "// {}", comment_text(annotation))?;
    }
    writeln!(
        output,
        "// {} (0x{:04X}) is used as transparent color key",
        key_label(options.color_key),
        options.color_key.packed()
    )?;
    writeln!(output)?;

    // Header guard
    writeln!(output, "#ifndef {}", ids.include_guard)?;
    writeln!(output, "#define {}", ids.include_guard)?;
    writeln!(output)?;

    writeln!(output, "#include <{}>", options.integer_header)?;
    writeln!(output)?;

    // Dimensions
    writeln!(output, "#define {}_WIDTH {}", ids.define_prefix, source.width)?;
    writeln!(output, "#define {}_HEIGHT {}", ids.define_prefix, source.height)?;
    writeln!(output)?;

    // Pixel array
    writeln!(output, "// RGB565 format pixel data")?;
    writeln!(output, "const uint16_t {}[] = {{", ids.variable_name)?;

    let line_count = data.len().div_ceil(VALUES_PER_LINE);
    for (line, chunk) in data.chunks(VALUES_PER_LINE).enumerate() {
        write!(output, "  ")?;
        for (i, value) in chunk.iter().enumerate() {
            if i > 0 {
                write!(output, ", ")?;
            }
            write!(output, "0x{:04X}", value)?;
        }
        if line + 1 < line_count {
            write!(output, ",")?;
        }
        writeln!(output)?;
    }

    writeln!(output, "}}; // End of {}", ids.variable_name)?;
    writeln!(output)?;

    // Header guard close
    writeln!(output, "#endif // {}", ids.include_guard)?;

    Ok(output)
}

/// Keep free text on its `//` line
fn comment_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn key_label(key: ColorKey) -> String {
    if key.is_magenta() {
        "Magenta".to_string()
    } else {
        format!("Color key RGB({}, {}, {})", key.r, key.g, key.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque(r: u8, g: u8, b: u8) -> Rgba {
        Rgba::new(r, g, b, 255)
    }

    #[test]
    fn test_identifiers() {
        let ids = HeaderIdentifiers::new("Agumon_Walk_0").unwrap();
        assert_eq!(ids.define_prefix, "AGUMON_WALK_0");
        assert_eq!(ids.include_guard, "AGUMON_WALK_0_H");
        assert_eq!(ids.variable_name, "Agumon_Walk_0_data");
        assert_eq!(ids.file_name(), "Agumon_Walk_0.h");
    }

    #[test]
    fn test_identifiers_empty_name() {
        assert!(matches!(
            HeaderIdentifiers::new(""),
            Err(HeaderError::EmptyName)
        ));
    }

    #[test]
    fn test_key_collision_scenario() {
        let pixels = [Rgba::new(255, 0, 255, 255), Rgba::new(0, 255, 0, 0)];
        let source = HeaderSource {
            logical_name: "Pair",
            source_label: "pair.png",
            annotation: None,
            width: 2,
            height: 1,
            pixels: &pixels,
        };

        let artifact = build_header(&source, &HeaderOptions::default()).unwrap();
        assert_eq!(artifact.data, vec![0xF81F, 0xF81F]);
        assert!(artifact.text.contains("  0xF81F, 0xF81F\n}; // End of Pair_data\n"));
    }

    #[test]
    fn test_full_generic_layout() {
        let pixels = [opaque(255, 0, 0), opaque(0, 255, 0)];
        let source = HeaderSource {
            logical_name: "Bg",
            source_label: "bg.png",
            annotation: None,
            width: 1,
            height: 2,
            pixels: &pixels,
        };

        let artifact = build_header(&source, &HeaderOptions::default()).unwrap();
        let expected = "\
// Converted from bg.png
// Magenta (0xF81F) is used as transparent color key

#ifndef BG_H
#define BG_H

#include <cstdint>

#define BG_WIDTH 1
#define BG_HEIGHT 2

// RGB565 format pixel data
const uint16_t Bg_data[] = {
  0xF800, 0x07E0
}; // End of Bg_data

#endif // BG_H
";
        assert_eq!(artifact.text, expected);
    }

    #[test]
    fn test_annotation_line() {
        let pixels = [opaque(0, 0, 0)];
        let source = HeaderSource {
            logical_name: "Agumon_Walk_0",
            source_label: "Agumon_2.png",
            annotation: Some("Action: Walk, Frame Index: 0"),
            width: 1,
            height: 1,
            pixels: &pixels,
        };

        let text = build_header(&source, &HeaderOptions::default())
            .unwrap()
            .text;
        assert!(text.starts_with(
            "// Converted from Agumon_2.png\n\
             // Action: Walk, Frame Index: 0\n\
             // Magenta (0xF81F) is used as transparent color key\n\n"
        ));
        assert!(text.contains("#ifndef AGUMON_WALK_0_H\n#define AGUMON_WALK_0_H\n"));
        assert!(text.contains("#define AGUMON_WALK_0_WIDTH 1\n"));
        assert!(text.contains("const uint16_t Agumon_Walk_0_data[] = {\n"));
        assert!(text.ends_with("#endif // AGUMON_WALK_0_H\n"));
    }

    #[test]
    fn test_comment_text_stays_on_one_line() {
        let pixels = [opaque(0, 0, 0)];
        let source = HeaderSource {
            logical_name: "Odd",
            source_label: "odd\n#error label.png",
            annotation: Some("Action: Walk\r\n#error action, Frame Index: 0"),
            width: 1,
            height: 1,
            pixels: &pixels,
        };

        let text = build_header(&source, &HeaderOptions::default())
            .unwrap()
            .text;
        assert!(text.starts_with(
            "// Converted from odd #error label.png\n\
             // Action: Walk  #error action, Frame Index: 0\n"
        ));
        assert!(!text.lines().any(|line| line.starts_with("#error")));
    }

    #[test]
    fn test_line_wrapping() {
        let pixels = vec![opaque(0, 0, 0); 25];
        let source = HeaderSource {
            logical_name: "Strip",
            source_label: "strip.png",
            annotation: None,
            width: 25,
            height: 1,
            pixels: &pixels,
        };

        let text = build_header(&source, &HeaderOptions::default())
            .unwrap()
            .text;
        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("const uint16_t"))
            .skip(1)
            .take_while(|l| !l.starts_with("};"))
            .collect();

        assert_eq!(body.len(), 3);
        assert_eq!(body[0].matches("0x").count(), 12);
        assert_eq!(body[1].matches("0x").count(), 12);
        assert_eq!(body[2], "  0x0000");
        assert!(body[0].starts_with("  0x0000, "));
        assert!(body[0].ends_with("0x0000,"));
        assert!(body[1].ends_with("0x0000,"));
    }

    #[test]
    fn test_exact_line_multiple_has_no_trailing_comma() {
        let pixels = vec![opaque(0, 0, 0); 24];
        let source = HeaderSource {
            logical_name: "Even",
            source_label: "even.png",
            annotation: None,
            width: 12,
            height: 2,
            pixels: &pixels,
        };

        let text = build_header(&source, &HeaderOptions::default())
            .unwrap()
            .text;
        assert!(text.contains("0x0000\n}; // End of Even_data"));
        assert_eq!(text.matches("0x0000").count(), 24);
    }

    #[test]
    fn test_values_parse_back_by_token() {
        let pixels: Vec<Rgba> = (0..30u8).map(|i| opaque(i * 8, i * 4, 255 - i)).collect();
        let source = HeaderSource {
            logical_name: "Grad",
            source_label: "grad.png",
            annotation: None,
            width: 6,
            height: 5,
            pixels: &pixels,
        };

        let artifact = build_header(&source, &HeaderOptions::default()).unwrap();
        let start = artifact.text.find('{').unwrap() + 1;
        let end = artifact.text.find("};").unwrap();
        let parsed: Vec<u16> = artifact.text[start..end]
            .split(',')
            .map(|t| u16::from_str_radix(t.trim().trim_start_matches("0x"), 16).unwrap())
            .collect();

        assert_eq!(parsed, artifact.data);
        assert_eq!(parsed.len(), 30);
    }

    #[test]
    fn test_custom_key_and_include() {
        let pixels = [Rgba::new(1, 2, 3, 0)];
        let source = HeaderSource {
            logical_name: "Dot",
            source_label: "dot.png",
            annotation: None,
            width: 1,
            height: 1,
            pixels: &pixels,
        };
        let options = HeaderOptions {
            color_key: ColorKey::new(0, 255, 255),
            alpha_threshold: 128,
            integer_header: "stdint.h".to_string(),
        };

        let artifact = build_header(&source, &options).unwrap();
        assert_eq!(artifact.data, vec![0x07FF]);
        assert!(artifact
            .text
            .contains("// Color key RGB(0, 255, 255) (0x07FF) is used as transparent color key\n"));
        assert!(artifact.text.contains("#include <stdint.h>\n"));
    }

    #[test]
    fn test_pixel_count_mismatch() {
        let pixels = [opaque(0, 0, 0); 3];
        let source = HeaderSource {
            logical_name: "Bad",
            source_label: "bad.png",
            annotation: None,
            width: 2,
            height: 2,
            pixels: &pixels,
        };

        let err = build_header(&source, &HeaderOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::PixelCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        let source = HeaderSource {
            logical_name: "Empty",
            source_label: "empty.png",
            annotation: None,
            width: 0,
            height: 4,
            pixels: &[],
        };

        assert!(matches!(
            build_header(&source, &HeaderOptions::default()),
            Err(HeaderError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let pixels = [opaque(0, 0, 0)];
        let source = HeaderSource {
            logical_name: "",
            source_label: "x.png",
            annotation: None,
            width: 1,
            height: 1,
            pixels: &pixels,
        };

        assert!(matches!(
            build_header(&source, &HeaderOptions::default()),
            Err(HeaderError::EmptyName)
        ));
    }
}
