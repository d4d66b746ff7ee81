use regex::{NoExpand, Regex};

const LEADING_SPACE: &str = r"^(\s+)\S";
const TRAILING_SPACE: &str = r"\S(\s+)$";
// A base that does not end in a dot, then the last dot, then up to six word
// characters. The extension may start with whitespace so that the boundary
// cleanup can see it.
const EXTENSION: &str = r"^(.*[^.])\.(\s*\w{1,6})$";

/// Compiled matchers for one run. Stateless once built.
#[derive(Debug, Clone)]
pub struct Patterns {
    leading: Regex,
    trailing: Regex,
    extension: Regex,
    uglies: Option<Regex>,
}

impl Patterns {
    pub fn new(ugly_characters: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            leading: Regex::new(LEADING_SPACE)?,
            trailing: Regex::new(TRAILING_SPACE)?,
            extension: Regex::new(EXTENSION)?,
            uglies: ugly_class(ugly_characters)
                .map(|class| Regex::new(&class))
                .transpose()?,
        })
    }

    /// The leading whitespace run, provided something other than whitespace
    /// follows it. An all-whitespace name never matches.
    pub fn leading_whitespace<'n>(&self, name: &'n str) -> Option<&'n str> {
        self.leading
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|run| run.as_str())
    }

    /// The trailing whitespace run, provided it is preceded by something other
    /// than whitespace.
    pub fn trailing_whitespace<'n>(&self, name: &'n str) -> Option<&'n str> {
        self.trailing
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|run| run.as_str())
    }

    pub fn has_uglies(&self, name: &str) -> bool {
        self.uglies.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Replaces every maximal run of ugly characters with one `replacement`.
    pub fn replace_uglies(&self, name: &str, replacement: char) -> String {
        let Some(uglies) = &self.uglies else {
            return name.to_string();
        };
        let mut buf = [0u8; 4];
        let replacement = replacement.encode_utf8(&mut buf);
        uglies.replace_all(name, NoExpand(replacement)).into_owned()
    }

    /// Splits `name` into base and extension, without the separating dot.
    pub fn split_extension<'n>(&self, name: &'n str) -> Option<NameComponents<'n>> {
        let caps = self.extension.captures(name)?;
        Some(NameComponents {
            base: caps.get(1)?.as_str(),
            extension: caps.get(2)?.as_str(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameComponents<'n> {
    pub base: &'n str,
    pub extension: &'n str,
}

impl NameComponents<'_> {
    pub fn join(base: &str, extension: &str) -> String {
        format!("{base}.{extension}")
    }
}

fn ugly_class(characters: &str) -> Option<String> {
    if characters.is_empty() {
        return None;
    }
    let mut class = String::from("[");
    for ch in characters.chars() {
        class.push_str(&regex::escape(ch.encode_utf8(&mut [0u8; 4])));
    }
    class.push_str("]+");
    Some(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_UGLIES: &str = "\"|\\:*?<>";

    fn patterns() -> Patterns {
        Patterns::new(DEFAULT_UGLIES).expect("default patterns")
    }

    #[test]
    fn leading_run_requires_trailing_content() {
        let p = patterns();
        assert_eq!(p.leading_whitespace("  foo.txt"), Some("  "));
        assert_eq!(p.leading_whitespace("\t foo"), Some("\t "));
        assert_eq!(p.leading_whitespace("foo"), None);
        assert_eq!(p.leading_whitespace("   "), None);
        assert_eq!(p.leading_whitespace(""), None);
    }

    #[test]
    fn trailing_run_requires_leading_content() {
        let p = patterns();
        assert_eq!(p.trailing_whitespace("foo  "), Some("  "));
        assert_eq!(p.trailing_whitespace("a b  "), Some("  "));
        assert_eq!(p.trailing_whitespace("foo"), None);
        assert_eq!(p.trailing_whitespace("   "), None);
    }

    #[test]
    fn ugly_runs_collapse() {
        let p = patterns();
        assert!(p.has_uglies("weird:name"));
        assert!(!p.has_uglies("plain name.txt"));
        assert_eq!(
            p.replace_uglies("weird:name|here.doc", '_'),
            "weird_name_here.doc"
        );
        assert_eq!(p.replace_uglies("a::b", '_'), "a_b");
        assert_eq!(p.replace_uglies("a\"\\b", '-'), "a-b");
    }

    #[test]
    fn ugly_class_escapes_metacharacters() {
        let p = Patterns::new("]^-[").expect("patterns");
        assert_eq!(p.replace_uglies("a]b^c-d[e", '_'), "a_b_c_d_e");
        assert!(!p.has_uglies("abc"));
    }

    #[test]
    fn empty_ugly_set_matches_nothing() {
        let p = Patterns::new("").expect("patterns");
        assert!(!p.has_uglies("a:b"));
        assert_eq!(p.replace_uglies("a:b", '_'), "a:b");
    }

    #[test]
    fn extension_split_cases() {
        let p = patterns();
        let parts = p.split_extension("report.txt").expect("split");
        assert_eq!((parts.base, parts.extension), ("report", "txt"));

        let parts = p.split_extension("archive.tar.gz").expect("split");
        assert_eq!((parts.base, parts.extension), ("archive.tar", "gz"));

        let parts = p.split_extension("notes. txt").expect("split");
        assert_eq!((parts.base, parts.extension), ("notes", " txt"));

        let parts = p.split_extension("notes .txt").expect("split");
        assert_eq!((parts.base, parts.extension), ("notes ", "txt"));

        assert_eq!(p.split_extension("README"), None);
        assert_eq!(p.split_extension(".bashrc"), None);
        assert_eq!(p.split_extension("movie.toolong"), None);
        assert_eq!(p.split_extension("odd.t-t"), None);
    }
}
