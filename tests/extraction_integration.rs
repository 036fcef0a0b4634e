//! Integration tests for the per-language feature extractors.

use std::path::Path;

use stylelearn::analysis::{get_extractor, language_for_extension, ExtractionStrategy};

fn complexity_of(language: &str, path: &str, source: &str) -> u32 {
    let extractor = get_extractor(language).unwrap();
    let features = extractor
        .extract_features(Path::new(path), source.as_bytes())
        .unwrap();
    assert_eq!(features.functions.len(), 1, "{}: one function expected", language);
    features.functions[0].complexity()
}

#[test]
fn test_three_ifs_and_a_loop_is_complexity_five() {
    let python = r#"
def classify(values):
    total = 0
    for value in values:
        if value > 10:
            total += 2
        if value < 0:
            total -= 1
        if value == 0:
            total = 0
    return total
"#;
    assert_eq!(complexity_of("python", "classify.py", python), 5);

    let go = r#"package sample

func Classify(values []int) int {
	total := 0
	for _, v := range values {
		if v > 10 {
			total += 2
		}
		if v < 0 {
			total--
		}
		if v == 0 {
			total = 0
		}
	}
	return total
}
"#;
    assert_eq!(complexity_of("go", "classify.go", go), 5);

    let rust = r#"
fn classify(values: &[i32]) -> i32 {
    let mut total = 0;
    for v in values {
        if *v > 10 {
            total += 2;
        }
        if *v < 0 {
            total -= 1;
        }
        if *v == 0 {
            total = 0;
        }
    }
    total
}
"#;
    assert_eq!(complexity_of("rust", "classify.rs", rust), 5);

    let javascript = r#"
function classify(values) {
  let total = 0;
  for (const v of values) {
    if (v > 10) {
      total += 2;
    }
    if (v < 0) {
      total -= 1;
    }
    if (v === 0) {
      total = 0;
    }
  }
  return total;
}
"#;
    assert_eq!(complexity_of("javascript", "classify.js", javascript), 5);
}

#[test]
fn test_syntax_errors_are_rejected() {
    let extractor = get_extractor("python").unwrap();
    let result = extractor.extract_features(Path::new("broken.py"), b"def broken(:\n    pass\n");
    assert!(result.is_err());

    let result = extractor.extract_features(Path::new("binary.py"), &[0xff, 0xfe, 0x00]);
    assert!(result.is_err());
}

#[test]
fn test_registry_covers_every_extension() {
    for (ext, language) in [
        ("py", "python"),
        ("rs", "rust"),
        ("go", "go"),
        ("js", "javascript"),
        ("jsx", "javascript"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
    ] {
        assert_eq!(language_for_extension(ext), Some(language), "{}", ext);
        let extractor = get_extractor(language).unwrap();
        assert!(extractor.handles_extension(ext));
    }
    assert_eq!(language_for_extension("md"), None);

    assert_eq!(
        get_extractor("python").unwrap().strategy(),
        ExtractionStrategy::SyntaxTree
    );
    assert_eq!(
        get_extractor("typescript").unwrap().strategy(),
        ExtractionStrategy::Heuristic
    );
}

#[test]
fn test_identifiers_and_imports_from_fixture() {
    let source = std::fs::read("testdata/python_project/src/inventory/service.py").unwrap();
    let features = get_extractor("python")
        .unwrap()
        .extract_features(Path::new("src/inventory/service.py"), &source)
        .unwrap();

    let names: Vec<&str> = features.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["restock_item", "list_low_stock", "quote_price"]);
    assert!(features.functions.iter().all(|f| f.documented));
    assert!(features
        .identifiers
        .constants
        .contains(&"LOW_STOCK_THRESHOLD".to_string()));
    assert_eq!(features.imports.len(), 2);
    assert!(features.imports.iter().all(|i| !i.wildcard && !i.relative));
    assert!(!features.is_test_file);
}
