//! Path layout shared by both delivery backends
//!
//! Remote and local trees use the same shape:
//!
//! ```text
//! src/site/notes/<garden path>     compiled note text
//! src/site/img/user/<vault path>   embedded images
//! ```

use crate::config::PathRewriteRule;
use crate::domain::VaultPath;

/// Prefix of every note file
pub const NOTE_PATH_BASE: &str = "src/site/notes/";

/// Prefix of every asset file
pub const IMAGE_PATH_BASE: &str = "src/site/";

/// Asset folder below [`IMAGE_PATH_BASE`] for images copied from the vault
pub const IMAGE_ASSET_PREFIX: &str = "img/user/";

/// Applies the first matching rewrite rule to a vault path
///
/// A rule matches when its `from` folder equals the path's leading folders.
/// The matched prefix is replaced by `to`; without a match the vault path is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use garden_sync::config::PathRewriteRule;
/// use garden_sync::core::paths::garden_path;
/// use garden_sync::domain::VaultPath;
///
/// let rules = vec![PathRewriteRule { from: "Public".into(), to: "".into() }];
/// let path = VaultPath::new("Public/Notes/a.md").unwrap();
/// assert_eq!(garden_path(&path, &rules), "Notes/a.md");
/// ```
pub fn garden_path(path: &VaultPath, rules: &[PathRewriteRule]) -> String {
    let vault = path.as_str();

    for rule in rules {
        let from = rule.from.trim_matches('/');
        let rest = match vault.strip_prefix(from) {
            Some(rest) if rest.starts_with('/') => rest,
            _ => continue,
        };

        let to = rule.to.trim_matches('/');
        let rewritten = if to.is_empty() {
            rest.to_string()
        } else {
            format!("{to}{rest}")
        };
        return rewritten.trim_start_matches('/').to_string();
    }

    vault.to_string()
}

/// Remote path of a note
pub fn note_path(garden_path: &str) -> String {
    format!("{NOTE_PATH_BASE}{}", strip_leading_separators(garden_path))
}

/// Remote path of an asset
pub fn image_path(relative_path: &str) -> String {
    format!("{IMAGE_PATH_BASE}{}", strip_leading_separators(relative_path))
}

/// Relative asset path for an image in the vault
pub fn asset_relative_path(image: &VaultPath) -> String {
    format!("{IMAGE_ASSET_PREFIX}{image}")
}

/// Link target written into compiled text for an embedded image
pub fn asset_url(image: &VaultPath) -> String {
    format!("/{}", asset_relative_path(image)).replace(' ', "%20")
}

/// The one rule every local write goes through
///
/// Backslashes become `/` and leading separators are removed. With
/// `slugify`, every segment below [`NOTE_PATH_BASE`] is slugified (file
/// extensions survive). Asset paths are never slugified: compiled text links
/// to them by their vault name.
pub fn local_relative_path(path: &str, slugify: bool) -> String {
    let normalized = path.replace('\\', "/");
    let stripped = strip_leading_separators(&normalized);

    let note = match stripped.strip_prefix(NOTE_PATH_BASE) {
        Some(note) if slugify => note,
        _ => return stripped.to_string(),
    };

    let segments: Vec<&str> = note.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.len().saturating_sub(1);
    let slug = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if i == last {
                slugify_file_name(segment)
            } else {
                slugify_segment(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("{NOTE_PATH_BASE}{slug}")
}

fn strip_leading_separators(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}

fn slugify_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("{}.{}", slugify_segment(stem), ext.to_lowercase())
        }
        _ => slugify_segment(name),
    }
}

/// Lowercase, alphanumerics kept, every other run of characters becomes `-`
pub fn slugify_segment(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    let mut pending_dash = false;

    for c in segment.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        // Nothing alphanumeric to keep; fall back to a stable placeholder
        return "untitled".to_string();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn rule(from: &str, to: &str) -> PathRewriteRule {
        PathRewriteRule {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test_case("Public/a.md", "a.md" ; "prefix removed")]
    #[test_case("Public/Sub/a.md", "Sub/a.md" ; "nested")]
    #[test_case("Publications/a.md", "Publications/a.md" ; "folder boundary respected")]
    #[test_case("Blog/post.md", "posts/post.md" ; "second rule")]
    #[test_case("Other/a.md", "Other/a.md" ; "no match")]
    fn test_garden_path_rules(input: &str, expected: &str) {
        let rules = vec![rule("Public", ""), rule("Blog/", "/posts"), rule("Blog", "never")];
        let path = VaultPath::new(input).unwrap();
        assert_eq!(garden_path(&path, &rules), expected);
    }

    #[test]
    fn test_remote_layout() {
        assert_eq!(note_path("a/b.md"), "src/site/notes/a/b.md");
        assert_eq!(note_path("/a.md"), "src/site/notes/a.md");
        assert_eq!(image_path("img/user/x.png"), "src/site/img/user/x.png");

        let image = VaultPath::new("assets/My Pic.png").unwrap();
        assert_eq!(asset_relative_path(&image), "img/user/assets/My Pic.png");
        assert_eq!(asset_url(&image), "/img/user/assets/My%20Pic.png");
    }

    #[test_case("/notes/My Note.md", false, "notes/My Note.md" ; "plain")]
    #[test_case("\\notes\\a.md", false, "notes/a.md" ; "backslashes")]
    #[test_case("/src/site/notes/Daily Notes/My Note!.MD", true, "src/site/notes/daily-notes/my-note.md" ; "slugified")]
    #[test_case("src/site/notes/Café Photo.MD", true, "src/site/notes/café-photo.md" ; "unicode kept")]
    #[test_case("src/site/notes/!!!.md", true, "src/site/notes/untitled.md" ; "nothing to keep")]
    #[test_case("src/site/img/user/Pics/My Cat.png", true, "src/site/img/user/Pics/My Cat.png" ; "images keep their vault name")]
    fn test_local_relative_path(input: &str, slugify: bool, expected: &str) {
        assert_eq!(local_relative_path(input, slugify), expected);
    }

    #[test]
    fn test_slugify_segment() {
        assert_eq!(slugify_segment("  Hello,  World  "), "hello-world");
        assert_eq!(slugify_segment("---"), "untitled");
    }
}
