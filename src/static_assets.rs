use std::collections::HashMap;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

pub const STATIC_PREFIX: &str = "/static/workbench";

pub struct EmbeddedFile {
    pub content: &'static str,
    pub content_type: &'static str,
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    format!("{}.js", &format!("{:x}", result)[..12])
}

static SCRIPT_ORDER: &[(&str, &str)] = &[
    ("workbench.js", include_str!("./scripts/workbench.js")),
];

/// Scripts keyed by their content-hashed file name.
pub static EMBEDDED_FILES: Lazy<HashMap<String, EmbeddedFile>> = Lazy::new(|| {
    SCRIPT_ORDER
        .iter()
        .map(|&(_name, content)| {
            (
                hash_content(content),
                EmbeddedFile {
                    content,
                    content_type: "application/javascript",
                },
            )
        })
        .collect()
});

pub fn get_script_tags() -> String {
    SCRIPT_ORDER
        .iter()
        .map(|&(_name, content)| {
            let hash = hash_content(content);
            format!("<script defer src=\"{}/{}\"></script>\n", STATIC_PREFIX, hash)
        })
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tags_point_at_embedded_files() {
        let tags = get_script_tags();
        for hash in EMBEDDED_FILES.keys() {
            assert!(tags.contains(&format!("{}/{}", STATIC_PREFIX, hash)));
        }
        assert_eq!(EMBEDDED_FILES.len(), SCRIPT_ORDER.len());
    }

    #[test]
    fn test_hash_is_stable_and_short() {
        let a = hash_content("console.log(1)");
        assert_eq!(a, hash_content("console.log(1)"));
        assert_ne!(a, hash_content("console.log(2)"));
        assert_eq!(a.len(), 12 + ".js".len());
    }
}
