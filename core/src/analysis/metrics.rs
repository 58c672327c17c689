//! Five synthetic 1..=10 scores, each a base plus a list of named adjustments.

use serde::{Deserialize, Serialize};

use super::facts::{SourceFacts, TestStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub code_quality: u8,
    pub efficiency: u8,
    pub best_practices: u8,
    pub complexity: u8,
    pub time_performance: u8,
}

pub struct Signals<'s, 'a> {
    pub facts: &'s SourceFacts<'a>,
    pub stats: &'s TestStats,
}

pub struct Adjustment {
    pub name: &'static str,
    pub delta: fn(&Signals) -> f64,
}

pub struct MetricSpec {
    pub name: &'static str,
    pub base: f64,
    pub adjustments: &'static [Adjustment],
}

impl MetricSpec {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn score(&self, s: &Signals) -> u8 {
        let raw = self.base + self.adjustments.iter().map(|a| (a.delta)(s)).sum::<f64>();
        // Half-way values round up, as 6.5 -> 7 and -0.5 -> 0.
        let rounded = (raw + 0.5).floor();
        rounded.clamp(Self::MIN as f64, Self::MAX as f64) as u8
    }
}

macro_rules! adj {
    ($name:literal, $f:expr) => {
        Adjustment {
            name: $name,
            delta: $f,
        }
    };
}

fn when(cond: bool, delta: f64) -> f64 {
    if cond {
        delta
    } else {
        0.0
    }
}

/// `long-methods-on-average` divides by `method_decls` (declarations only,
/// not every `public` token), so long single-method files are penalized.
pub static CODE_QUALITY: MetricSpec = MetricSpec {
    name: "codeQuality",
    base: 7.0,
    adjustments: &[
        adj!("doc-comments", |s| when(s.facts.contains("/**") && s.facts.contains("*/"), 1.0)),
        adj!("doc-tags", |s| when(s.facts.contains("@param") || s.facts.contains("@return"), 0.5)),
        adj!("private-members", |s| when(s.facts.contains("private "), 0.5)),
        adj!("long-methods-on-average", |s| {
            let f = s.facts;
            when(
                f.method_decls > 0 && f.line_count as f64 / f.method_decls as f64 > 30.0,
                -1.0,
            )
        }),
    ],
};

pub static EFFICIENCY: MetricSpec = MetricSpec {
    name: "efficiency",
    base: 6.0,
    adjustments: &[
        adj!("pass-ratio", |s| s.stats.pass_ratio() * 2.0),
        adj!("average-time", |s| match s.stats.avg_millis {
            Some(ms) if ms < 100.0 => 2.0,
            Some(ms) if ms < 500.0 => 1.0,
            _ => 0.0,
        }),
    ],
};

/// `main-only` compares against `method_decls`, which counts method
/// declarations alone. A `public class` line is not one, so every program
/// whose sole method is `main` loses a point here and lands on 6 unless
/// another adjustment fires.
pub static BEST_PRACTICES: MetricSpec = MetricSpec {
    name: "bestPractices",
    base: 7.0,
    adjustments: &[
        adj!("private-members", |s| when(s.facts.contains("private "), 0.5)),
        adj!("final-members", |s| when(s.facts.contains("final "), 0.5)),
        adj!("try-catch", |s| when(s.facts.contains("try") && s.facts.contains("catch"), 0.5)),
        adj!("type-hierarchy", |s| when(s.facts.contains("implements ") || s.facts.contains("extends "), 0.5)),
        adj!("collections", |s| when(s.facts.contains("ArrayList") || s.facts.contains("HashMap"), 0.5)),
        adj!("main-only", |s| {
            let f = s.facts;
            when(
                f.contains("public static void main") && f.main_methods == f.method_decls,
                -1.0,
            )
        }),
    ],
};

pub static COMPLEXITY: MetricSpec = MetricSpec {
    name: "complexity",
    base: 8.0,
    adjustments: &[
        adj!("pass-ratio", |s| {
            let ratio = s.stats.pass_ratio();
            if ratio > 0.8 {
                when(s.facts.line_count < 100, 1.0)
            } else {
                -(1.0 - ratio) * 2.0
            }
        }),
        adj!("loops-with-collections", |s| {
            let f = s.facts;
            let loops = f.contains("for (") || f.contains("while (");
            let collections = f.contains("List<") || f.contains("Map<") || f.contains("Set<");
            when(loops && collections, 0.5)
        }),
        adj!("working-recursion", |s| when(s.facts.has_recursion() && s.stats.pass_ratio() > 0.8, 1.0)),
    ],
};

pub static TIME_PERFORMANCE: MetricSpec = MetricSpec {
    name: "timePerformance",
    base: 6.0,
    adjustments: &[
        adj!("average-time", |s| match s.stats.avg_millis {
            Some(ms) if ms < 50.0 => 3.0,
            Some(ms) if ms < 200.0 => 2.0,
            Some(ms) if ms < 500.0 => 1.0,
            _ => 0.0,
        }),
        // The remaining adjustments only apply when nothing was timed.
        adj!("hashed-collections", |s| {
            when(
                s.stats.avg_millis.is_none()
                    && (s.facts.contains("HashMap") || s.facts.contains("HashSet")),
                1.0,
            )
        }),
        adj!("streams-over-loops", |s| {
            when(
                s.stats.avg_millis.is_none()
                    && !s.facts.contains("for (")
                    && s.facts.contains("stream()"),
                1.0,
            )
        }),
        adj!("nested-loops", |s| when(s.stats.avg_millis.is_none() && s.facts.nested_for_loops > 1, -1.0)),
    ],
};

impl PerformanceMetrics {
    pub fn measure(facts: &SourceFacts, stats: &TestStats) -> Self {
        let s = Signals { facts, stats };
        let m = Self {
            code_quality: CODE_QUALITY.score(&s),
            efficiency: EFFICIENCY.score(&s),
            best_practices: BEST_PRACTICES.score(&s),
            complexity: COMPLEXITY.score(&s),
            time_performance: TIME_PERFORMANCE.score(&s),
        };
        log::debug!("{:?}", m);
        m
    }

    pub fn as_array(&self) -> [(&'static str, u8); 5] {
        [
            (CODE_QUALITY.name, self.code_quality),
            (EFFICIENCY.name, self.efficiency),
            (BEST_PRACTICES.name, self.best_practices),
            (COMPLEXITY.name, self.complexity),
            (TIME_PERFORMANCE.name, self.time_performance),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn stats(total: usize, passed: usize, avg_millis: Option<f64>) -> TestStats {
        TestStats {
            total,
            passed,
            avg_millis,
        }
    }

    fn measure(code: &str, stats: TestStats) -> PerformanceMetrics {
        PerformanceMetrics::measure(&SourceFacts::scan(code), &stats)
    }

    #[test]
    fn rounding_is_half_up() {
        static HALF: MetricSpec = MetricSpec {
            name: "half",
            base: 6.0,
            adjustments: &[adj!("half", |_| 0.5)],
        };
        let facts = SourceFacts::scan("");
        let st = TestStats::default();
        assert_eq!(HALF.score(&Signals { facts: &facts, stats: &st }), 7);
    }

    #[test]
    fn scores_are_clamped() {
        static HUGE: MetricSpec = MetricSpec {
            name: "huge",
            base: 7.0,
            adjustments: &[adj!("up", |_| 100.0)],
        };
        static TINY: MetricSpec = MetricSpec {
            name: "tiny",
            base: 1.0,
            adjustments: &[adj!("down", |_| -100.0)],
        };
        let facts = SourceFacts::scan("");
        let st = TestStats::default();
        let s = Signals { facts: &facts, stats: &st };
        assert_eq!(HUGE.score(&s), 10);
        assert_eq!(TINY.score(&s), 1);
    }

    #[test]
    fn main_only_program() {
        let code = "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"hi\");\n    }\n}\n";
        let m = measure(code, stats(1, 1, Some(30.0)));
        assert_eq!(
            m,
            PerformanceMetrics {
                code_quality: 7,
                efficiency: 10,
                best_practices: 6,
                complexity: 9,
                time_performance: 9,
            }
        );
    }

    #[test]
    fn failing_untimed_program() {
        let code = "public class A {\n  private final Map<String, Integer> m = new HashMap<>();\n  public int sum(List<Integer> xs) {\n    try { return xs.stream().mapToInt(x -> x).sum(); } catch (Exception e) { return 0; }\n  }\n}\n";
        let m = measure(code, stats(2, 0, None));
        assert_eq!(
            m,
            PerformanceMetrics {
                // 7 + 0.5
                code_quality: 8,
                // 6 + 0
                efficiency: 6,
                // 7 + 0.5 * 4
                best_practices: 9,
                // 8 - 2
                complexity: 6,
                // 6 + 1 + 1
                time_performance: 8,
            }
        );
    }

    #[test]
    fn metrics_always_in_range() {
        let nested = "for (int i = 0; i < n; i++) { for (int j = 0; j < n; j++) { } }\n".repeat(50);
        let many = "public void a() {}\n".repeat(200);
        let inputs: [&str; 5] = [
            "",
            "public class X {}",
            "/** */ public class X { private final int a; /** @param a */ public X(int a) { this.a = a; } }",
            &nested,
            &many,
        ];
        for code in inputs {
            for st in [
                stats(0, 0, None),
                stats(3, 3, Some(1.0)),
                stats(3, 0, Some(10_000.0)),
                stats(5, 4, Some(250.0)),
            ] {
                for (name, v) in measure(code, st).as_array() {
                    assert!((1..=10).contains(&v), "{} = {} for {:?}", name, v, code);
                }
            }
        }
    }
}
