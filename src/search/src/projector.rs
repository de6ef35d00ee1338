//! Projection of registry results into display records.

use quarry_core::search::{DisplayRecord, RawResult, FLAG_MARKER};

/// Descriptions longer than this many bytes are truncated.
pub const DESCRIPTION_TRUNC_LENGTH: usize = 44;

/// Docker Hub index label; single-segment names live under `library/`.
const DOCKER_HUB_INDEX: &str = "docker.io";

/// Short index label for a registry host.
///
/// Hosts with more than two labels keep only the last two
/// (`registry.fedoraproject.org` → `fedoraproject.org`).
pub fn index_label(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// Project a registry result into a display record.
pub fn project(raw: &RawResult, registry: &str, index: &str, truncate: bool) -> DisplayRecord {
    let name = if index == DOCKER_HUB_INDEX && !raw.name.contains('/') {
        format!("{}/library/{}", index, raw.name)
    } else {
        format!("{}/{}", registry, raw.name)
    };

    DisplayRecord {
        index: index.to_string(),
        name,
        description: format_description(&raw.description, truncate),
        stars: raw.star_count,
        official: marker(raw.is_official),
        automated: marker(raw.is_automated),
    }
}

fn format_description(description: &str, truncate: bool) -> String {
    let description = description.replace('\n', " ");
    if truncate && description.len() > DESCRIPTION_TRUNC_LENGTH {
        // Byte cut; a split multibyte character is emitted lossily.
        let head = String::from_utf8_lossy(&description.as_bytes()[..DESCRIPTION_TRUNC_LENGTH]);
        format!("{head}...")
    } else {
        description
    }
}

fn marker(flag: bool) -> String {
    if flag {
        FLAG_MARKER.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, description: &str) -> RawResult {
        RawResult {
            name: name.to_string(),
            description: description.to_string(),
            star_count: 12,
            is_official: true,
            is_automated: false,
        }
    }

    #[test]
    fn test_index_label_three_labels() {
        assert_eq!(index_label("registry.fedoraproject.org"), "fedoraproject.org");
        assert_eq!(index_label("a.b.c.example.com"), "example.com");
    }

    #[test]
    fn test_index_label_short_hosts() {
        assert_eq!(index_label("docker.io"), "docker.io");
        assert_eq!(index_label("quay.io"), "quay.io");
        assert_eq!(index_label("localhost"), "localhost");
    }

    #[test]
    fn test_docker_hub_library_rewrite() {
        let record = project(&raw("foo", ""), "docker.io", "docker.io", true);
        assert_eq!(record.name, "docker.io/library/foo");
    }

    #[test]
    fn test_docker_hub_namespaced_name_kept() {
        let record = project(&raw("ns/foo", ""), "docker.io", "docker.io", true);
        assert_eq!(record.name, "docker.io/ns/foo");
    }

    #[test]
    fn test_other_registry_name() {
        let record = project(
            &raw("fedora", ""),
            "registry.fedoraproject.org",
            "fedoraproject.org",
            true,
        );
        assert_eq!(record.name, "registry.fedoraproject.org/fedora");
        assert_eq!(record.index, "fedoraproject.org");
    }

    #[test]
    fn test_truncates_long_description() {
        let description = "a".repeat(45);
        let record = project(&raw("foo", &description), "quay.io", "quay.io", true);
        assert_eq!(record.description, format!("{}...", "a".repeat(44)));
    }

    #[test]
    fn test_no_truncation_when_disabled() {
        let description = "a".repeat(45);
        let record = project(&raw("foo", &description), "quay.io", "quay.io", false);
        assert_eq!(record.description, description);
    }

    #[test]
    fn test_exact_threshold_not_truncated() {
        let description = "b".repeat(44);
        let record = project(&raw("foo", &description), "quay.io", "quay.io", true);
        assert_eq!(record.description, description);
    }

    #[test]
    fn test_newlines_collapsed_before_measuring() {
        let record = project(&raw("foo", "line one\nline two"), "quay.io", "quay.io", true);
        assert_eq!(record.description, "line one line two");

        // 22 + newline + 22 = 45 bytes after collapsing
        let description = format!("{}\n{}", "x".repeat(22), "y".repeat(22));
        let record = project(&raw("foo", &description), "quay.io", "quay.io", true);
        assert_eq!(
            record.description,
            format!("{} {}...", "x".repeat(22), "y".repeat(21))
        );
    }

    #[test]
    fn test_truncation_inside_multibyte_char_does_not_panic() {
        // 43 ASCII bytes then a 2-byte character straddling the cut
        let description = format!("{}éééé", "a".repeat(43));
        let record = project(&raw("foo", &description), "quay.io", "quay.io", true);
        assert!(record.description.starts_with(&"a".repeat(43)));
        assert!(record.description.ends_with("..."));
    }

    #[test]
    fn test_markers() {
        let record = project(&raw("foo", ""), "quay.io", "quay.io", true);
        assert_eq!(record.official, "[OK]");
        assert_eq!(record.automated, "");
        assert_eq!(record.stars, 12);
    }
}
