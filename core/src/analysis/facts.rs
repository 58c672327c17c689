//! A best-effort lexical scan of Java-like source. No parsing happens here:
//! every fact is a regex or substring count, computed once per evaluation.

use std::{collections::HashMap, ops::Range};

use lazy_regex::{lazy_regex, Lazy, Regex};

use crate::testing::TestResult;

static RE_CLASS_DOC: Lazy<Regex> = lazy_regex!(r"/\*\*[\s\S]*?\*/\s*public\s+class");
static RE_METHOD_DECL: Lazy<Regex> =
    lazy_regex!(r"(?:public|private|protected)\s+[\w<>\[\],\s]+\s+\w+\s*\(");
static RE_DOCUMENTED_METHOD: Lazy<Regex> =
    lazy_regex!(r"/\*\*[\s\S]*?\*/\s*(?:public|private|protected)\s+[\w<>\[\],\s]+\s+\w+\s*\(");
static RE_METHOD_HEAD: Lazy<Regex> =
    lazy_regex!(r"(?:public|private|protected)\s+[\w<>\[\],\s]+\s+(\w+)\s*\([^)]*\)\s*\{");
static RE_INLINE_COMMENT: Lazy<Regex> = lazy_regex!(r"//[^\n]*");
static RE_FIELD: Lazy<Regex> =
    lazy_regex!(r"\s+(?:private|public|protected)\s+[\w<>\[\],\s]+\s+\w+(?:\s*=\s*[^;]+)?;");
static RE_TRY_CATCH: Lazy<Regex> = lazy_regex!(r"try\s*\{[\s\S]*?catch\s*\([\s\S]*?\)\s*\{");
static RE_EMPTY_CATCH: Lazy<Regex> = lazy_regex!(r"catch\s*\([\s\S]*?\)\s*\{\s*\}");
static RE_CAMEL_IDENT: Lazy<Regex> = lazy_regex!(r"\b[a-z][a-zA-Z0-9]*\b");
static RE_SNAKE_IDENT: Lazy<Regex> = lazy_regex!(r"\b[a-z][a-zA-Z0-9_]*_[a-zA-Z0-9_]*\b");
static RE_MAIN: Lazy<Regex> = lazy_regex!(r"public\s+static\s+void\s+main");
static RE_NESTED_FOR: Lazy<Regex> = lazy_regex!(r"for\s*\([^)]*\)\s*\{[^}]*for\s*\([^)]*\)");

/// A method head and the text up to the next method head (or end of file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpan {
    pub name: String,
    /// Byte range from the head's start to the next head's start.
    pub range: Range<usize>,
    /// Byte offset just past the opening brace.
    pub body_start: usize,
}

#[derive(Debug, Clone)]
pub struct SourceFacts<'a> {
    pub code: &'a str,
    pub line_count: usize,
    pub has_public_class: bool,
    pub has_class_doc: bool,
    pub method_decls: usize,
    pub documented_methods: usize,
    pub methods: Vec<MethodSpan>,
    pub inline_comments: usize,
    pub private_fields: usize,
    pub public_fields: usize,
    pub try_catch_blocks: usize,
    pub empty_catch_blocks: usize,
    pub camel_idents: usize,
    pub snake_idents: usize,
    pub duplicate_windows: usize,
    pub main_methods: usize,
    pub nested_for_loops: usize,
}

impl<'a> SourceFacts<'a> {
    pub fn scan(code: &'a str) -> Self {
        let (private_fields, public_fields) =
            RE_FIELD
                .find_iter(code)
                .fold((0, 0), |(private, public), m| {
                    let s = m.as_str();
                    (
                        private + s.contains("private") as usize,
                        public + s.contains("public") as usize,
                    )
                });

        Self {
            code,
            line_count: code.split('\n').count(),
            has_public_class: code.contains("public class"),
            has_class_doc: RE_CLASS_DOC.is_match(code),
            method_decls: RE_METHOD_DECL.find_iter(code).count(),
            documented_methods: RE_DOCUMENTED_METHOD.find_iter(code).count(),
            methods: method_spans(code),
            inline_comments: RE_INLINE_COMMENT.find_iter(code).count(),
            private_fields,
            public_fields,
            try_catch_blocks: RE_TRY_CATCH.find_iter(code).count(),
            empty_catch_blocks: RE_EMPTY_CATCH.find_iter(code).count(),
            camel_idents: RE_CAMEL_IDENT.find_iter(code).count(),
            snake_idents: RE_SNAKE_IDENT.find_iter(code).count(),
            duplicate_windows: duplicate_windows(code),
            main_methods: RE_MAIN.find_iter(code).count(),
            nested_for_loops: RE_NESTED_FOR.find_iter(code).count(),
        }
    }

    #[inline]
    pub fn contains(&self, pat: &str) -> bool {
        self.code.contains(pat)
    }

    /// Line count of each method span.
    pub fn method_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.methods
            .iter()
            .map(|m| self.code[m.range.clone()].split('\n').count())
    }

    /// Whether any method calls itself by name inside its own span.
    pub fn has_recursion(&self) -> bool {
        self.methods.iter().any(|m| {
            let body = &self.code[m.body_start..m.range.end];
            calls(body, &m.name)
        })
    }
}

fn method_spans(code: &str) -> Vec<MethodSpan> {
    let heads: Vec<_> = RE_METHOD_HEAD
        .captures_iter(code)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let name = c.get(1)?;
            Some((whole.start(), whole.end(), name.as_str().to_owned()))
        })
        .collect();

    heads
        .iter()
        .enumerate()
        .map(|(i, (start, body_start, name))| {
            let end = heads.get(i + 1).map(|h| h.0).unwrap_or(code.len());
            MethodSpan {
                name: name.clone(),
                range: *start..end,
                body_start: *body_start,
            }
        })
        .collect()
}

/// `name(` or `this.name(`, not glued to a longer identifier or another receiver.
fn calls(body: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    body.match_indices(name).any(|(i, _)| {
        let before = &body[..i];
        let unqualified = before
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident(c) && c != '.');
        let on_self = before.ends_with("this.");
        let after = body[i + name.len()..].trim_start();
        (unqualified || on_self) && after.starts_with('(')
    })
}

/// Number of distinct three-line windows that occur more than once.
fn duplicate_windows(code: &str) -> usize {
    let lines: Vec<&str> = code.split('\n').collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for i in 0..lines.len().saturating_sub(3) {
        let window = lines[i..i + 3].join("\n");
        if !window.trim().is_empty() && !window.contains("import ") {
            *seen.entry(window).or_default() += 1;
        }
    }
    seen.values().filter(|&&n| n > 1).count()
}

/// Aggregates over the test results of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TestStats {
    pub total: usize,
    pub passed: usize,
    /// Mean of the recorded execution times, in milliseconds.
    pub avg_millis: Option<f64>,
}

impl TestStats {
    pub fn from_results(results: &[TestResult]) -> Self {
        let times: Vec<f64> = results.iter().filter_map(|r| r.execution_millis()).collect();
        let avg_millis = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<f64>() / times.len() as f64)
        };
        Self {
            total: results.len(),
            passed: results.iter().filter(|r| r.passed).count(),
            avg_millis,
        }
    }

    pub fn pass_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    const COUNTER: &str = r#"/**
 * Counts property views.
 */
public class PropertyCounter {
    private int count;

    /**
     * Increments the counter.
     */
    public void incrementCounter() {
        count++; // one more view
    }

    public int getCount() {
        return count;
    }
}
"#;

    #[test]
    fn scan_counter() {
        let f = SourceFacts::scan(COUNTER);
        assert!(f.has_public_class);
        assert!(f.has_class_doc);
        assert_eq!(f.method_decls, 2);
        assert_eq!(f.documented_methods, 1);
        assert_eq!(f.inline_comments, 1);
        assert_eq!((f.private_fields, f.public_fields), (1, 0));
        assert_eq!(f.try_catch_blocks, 0);
        assert_eq!(f.line_count, 18);

        let names: Vec<_> = f.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["incrementCounter", "getCount"]);
        let lengths: Vec<_> = f.method_lengths().collect();
        assert_eq!(lengths, [5, 5]);
        assert!(!f.has_recursion());
    }

    #[test]
    fn recursion_is_a_self_call() {
        let f = SourceFacts::scan(
            "public class F {\n  public static long fact(int n) {\n    return n <= 1 ? 1 : n * fact(n - 1);\n  }\n}",
        );
        assert!(f.has_recursion());

        let f = SourceFacts::scan(
            "public class F {\n  public int fact(int n) {\n    return factorial(n);\n  }\n}",
        );
        assert!(!f.has_recursion());

        let f = SourceFacts::scan("class S {\n  public int sum(List<Integer> xs) {\n    return xs.stream().mapToInt(x -> x).sum();\n  }\n}");
        assert!(!f.has_recursion());

        let f = SourceFacts::scan("class S {\n  public int walk(Node n) {\n    return n == null ? 0 : 1 + this.walk(n.next);\n  }\n}");
        assert!(f.has_recursion());
    }

    #[test]
    fn catches() {
        let f = SourceFacts::scan("try { a(); } catch (Exception e) { }\ntry { b(); } catch (IOException e) { log(e); }");
        assert_eq!(f.try_catch_blocks, 2);
        assert_eq!(f.empty_catch_blocks, 1);
    }

    #[test]
    fn naming() {
        let f = SourceFacts::scan("int my_value = other_value + third_one;");
        assert_eq!(f.snake_idents, 3);
        assert_eq!(f.camel_idents, 1);
    }

    #[test]
    fn duplicates_count_distinct_windows() {
        let block = "a();\nb();\nc();\n";
        assert_eq!(duplicate_windows(&format!("{}{}x", block, block)), 1);
        assert_eq!(duplicate_windows("import a;\nimport a;\nimport a;\nimport a;\nimport a;\n"), 0);
        assert_eq!(duplicate_windows("\n\n\n\n\n\n"), 0);
        assert_eq!(duplicate_windows("a"), 0);
    }

    #[test]
    fn test_stats() {
        let r = |passed, ms: Option<u64>| TestResult {
            test_case_id: "1".to_owned(),
            name: "t".to_owned(),
            passed,
            message: None,
            execution_time: ms.map(Duration::from_millis),
        };
        let stats = TestStats::from_results(&[r(true, Some(10)), r(false, Some(30)), r(true, None)]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.avg_millis, Some(20.0));
        assert!((stats.pass_ratio() - 2.0 / 3.0).abs() < 1e-9);

        assert_eq!(TestStats::from_results(&[]).pass_ratio(), 0.0);
        assert_eq!(TestStats::from_results(&[]).avg_millis, None);
    }
}
