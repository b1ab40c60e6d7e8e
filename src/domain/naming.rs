//! Naming rules shared by the collector and the publisher
//!
//! The collector turns a product display name into a filesystem-safe file
//! name. The publisher strips the extension off that file name to get the
//! remote identifier and turns the identifier back into a readable model name.
//! The reverse direction is lossy: characters stripped on the way in are gone.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref DISALLOWED_NAME_CHARS: Regex =
        Regex::new(r"[^a-z0-9-]").expect("static pattern is valid");
}

/// Lowercase, spaces to hyphens, then drop everything outside `[a-z0-9-]`.
pub fn filename_base(display_name: &str) -> String {
    let lowered = display_name.to_lowercase().replace(' ', "-");
    DISALLOWED_NAME_CHARS.replace_all(&lowered, "").into_owned()
}

/// Extension of the last path segment of an image locator, without the dot.
///
/// Query strings and fragments are ignored, and the result is lower-cased and
/// restricted to ASCII alphanumerics. `None` when nothing usable remains.
pub fn locator_extension(locator: &str) -> Option<String> {
    let path = match Url::parse(locator) {
        Ok(url) => url.path().to_string(),
        Err(_) => locator
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let segment = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let (_, extension) = split_extension(segment);

    extension
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty())
}

/// Build the on-disk file name for a product image.
pub fn derive_filename(display_name: &str, locator: &str, default_extension: &str) -> String {
    let extension = locator_extension(locator)
        .unwrap_or_else(|| default_extension.trim_start_matches('.').to_ascii_lowercase());
    format!("{}.{}", filename_base(display_name), extension)
}

/// Split `name` into stem and extension (without the dot).
///
/// Leading dots belong to the stem, so `.png` has no extension and
/// `archive.tar.gz` splits into `archive.tar` and `gz`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let Some(dot) = name.rfind('.') else {
        return (name, None);
    };
    if name[..dot].chars().all(|c| c == '.') {
        return (name, None);
    }
    (&name[..dot], Some(&name[dot + 1..]))
}

/// Remote identifier for an image file: the file name minus its extension.
pub fn publish_identifier(file_name: &str) -> &str {
    split_extension(file_name).0
}

/// Whether `file_name` ends with `.<ext>` for one of `extensions`, ignoring case.
pub fn has_image_extension(file_name: &str, extensions: &[String]) -> bool {
    let lowered = file_name.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        lowered.ends_with(&format!(".{ext}"))
    })
}

/// Readable model name recovered from a publish identifier.
///
/// `galaxy-s24-ultra` becomes `Galaxy S24 Ultra`.
pub fn model_name(identifier: &str) -> String {
    let spaced = identifier.replace('-', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Upper-case every letter that follows a non-letter, lower-case the rest.
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Galaxy S24 Ultra", "https://cdn.example.com/img/s24.png", "galaxy-s24-ultra.png")]
    #[case("iPhone 15 Pro (128GB)", "https://cdn.example.com/a/b/iphone.JPG", "iphone-15-pro-128gb.jpg")]
    #[case("Nord CE 4", "https://cdn.example.com/nord.webp?w=300&h=300", "nord-ce-4.webp")]
    #[case("Pixel 8a", "https://cdn.example.com/images/pixel8a", "pixel-8a.webp")]
    #[case("Edge+ 2023", "/static/edge.avif#main", "edge-2023.avif")]
    #[case("Redmi Note 13", "https://cdn.example.com/v1.2/redmi", "redmi-note-13.webp")]
    fn test_derive_filename(#[case] name: &str, #[case] locator: &str, #[case] expected: &str) {
        assert_eq!(derive_filename(name, locator, "webp"), expected);
    }

    #[rstest]
    #[case("galaxy-s24-ultra.png", "galaxy-s24-ultra", Some("png"))]
    #[case("archive.tar.gz", "archive.tar", Some("gz"))]
    #[case(".png", ".png", None)]
    #[case("noext", "noext", None)]
    #[case("..hidden.jpg", "..hidden", Some("jpg"))]
    fn test_split_extension(
        #[case] name: &str,
        #[case] stem: &str,
        #[case] extension: Option<&str>,
    ) {
        assert_eq!(split_extension(name), (stem, extension));
    }

    #[rstest]
    #[case("galaxy-s24-ultra", "Galaxy S24 Ultra")]
    #[case("iphone-15--pro", "Iphone 15 Pro")]
    #[case("-leading-and-trailing-", "Leading And Trailing")]
    #[case("5g-phone", "5G Phone")]
    fn test_model_name(#[case] identifier: &str, #[case] expected: &str) {
        assert_eq!(model_name(identifier), expected);
    }

    #[test]
    fn test_has_image_extension_is_case_insensitive() {
        let extensions: Vec<String> = ["png", "jpg", ".webp"].iter().map(|s| s.to_string()).collect();
        assert!(has_image_extension("a.PNG", &extensions));
        assert!(has_image_extension("b.jpg", &extensions));
        assert!(has_image_extension("c.WebP", &extensions));
        assert!(!has_image_extension("d.gif", &extensions));
        assert!(!has_image_extension("png", &extensions));
        assert!(!has_image_extension("e.png.part", &extensions));
    }

    #[test]
    fn test_publish_identifier() {
        assert_eq!(publish_identifier("galaxy-s24-ultra.png"), "galaxy-s24-ultra");
        assert_eq!(publish_identifier("edge.tar.avif"), "edge.tar");
    }

    proptest! {
        #[test]
        fn prop_derived_filename_is_filesystem_safe(
            name in "\\PC{1,40}",
            locator in "(https://cdn\\.example\\.com/)?[a-zA-Z0-9_./?=#-]{0,30}",
        ) {
            let pattern = Regex::new(r"^[a-z0-9-]*\.[a-z0-9]+$").unwrap();
            let file_name = derive_filename(&name, &locator, "webp");
            prop_assert!(pattern.is_match(&file_name), "unexpected file name {:?}", file_name);
        }

        #[test]
        fn prop_derivation_is_deterministic(
            name in "\\PC{1,40}",
            locator in "[a-zA-Z0-9_./-]{0,30}",
        ) {
            prop_assert_eq!(
                derive_filename(&name, &locator, "webp"),
                derive_filename(&name, &locator, "webp")
            );
        }

        #[test]
        fn prop_model_name_has_no_hyphens_and_capitalized_words(name in "[A-Za-z0-9 ]{1,40}") {
            let identifier = filename_base(&name);
            let model = model_name(&identifier);
            prop_assert!(!model.contains('-'));
            for word in model.split(' ') {
                if let Some(leading) = word.chars().next().filter(|c| c.is_alphabetic()) {
                    prop_assert!(leading.is_uppercase(), "word {:?} in {:?}", word, model);
                }
            }
        }
    }
}
