use super::{
    facts::{SourceFacts, TestStats},
    feedback::{Category, QualityFeedback, Severity},
};

/// One independent check over the scanned source.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, facts: &SourceFacts, stats: &TestStats) -> Option<QualityFeedback>;
}

/// The full battery, in reporting order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ClassDoc),
        Box::new(MethodDoc),
        Box::new(InlineComments),
        Box::new(MethodLength),
        Box::new(Encapsulation),
        Box::new(ObjectOrientation),
        Box::new(ExceptionHandling),
        Box::new(InputValidation),
        Box::new(NamingConvention),
        Box::new(Duplication),
        Box::new(ModernFeatures),
    ]
}

/// Runs every rule in order and appends the summary item, if any.
pub fn review(rules: &[Box<dyn Rule>], facts: &SourceFacts, stats: &TestStats) -> Vec<QualityFeedback> {
    let mut items: Vec<_> = rules
        .iter()
        .filter_map(|r| {
            let item = r.check(facts, stats);
            if let Some(item) = &item {
                log::trace!("rule {}: {} {}", r.name(), item.severity, item.message);
            }
            item
        })
        .collect();
    items.extend(summarize(&items));
    items
}

pub fn summarize(items: &[QualityFeedback]) -> Option<QualityFeedback> {
    let count = |sev| items.iter().filter(|f| f.severity == sev).count();
    let successes = count(Severity::Success);
    let warnings = count(Severity::Warning);

    if successes > warnings + 1 {
        Some(
            QualityFeedback::success(Category::Summary, "Overall excellent code quality")
                .details("Your code demonstrates good practices in multiple areas. Great job!"),
        )
    } else if warnings > successes {
        Some(
            QualityFeedback::info(Category::Summary, "Several areas for improvement").details(
                "Your code works but has several areas that could be improved for better quality and maintainability.",
            ),
        )
    } else {
        None
    }
}

pub struct ClassDoc;

impl Rule for ClassDoc {
    fn name(&self) -> &'static str {
        "class-doc"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        if f.has_class_doc {
            Some(
                QualityFeedback::success(Category::Documentation, "Excellent class documentation")
                    .details("Your code includes clear Javadoc for the class, which helps others understand its purpose and usage."),
            )
        } else if f.has_public_class {
            Some(
                QualityFeedback::warning(Category::Documentation, "Missing class Javadoc")
                    .details("Adding a Javadoc comment to your class would improve documentation. Describe the purpose of the class."),
            )
        } else {
            None
        }
    }
}

pub struct MethodDoc;

impl Rule for MethodDoc {
    fn name(&self) -> &'static str {
        "method-doc"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let (documented, total) = (f.documented_methods, f.method_decls);
        if total == 0 {
            return None;
        }
        let coverage = documented as f64 / total as f64;

        if coverage >= 0.8 {
            Some(
                QualityFeedback::success(Category::Documentation, "Comprehensive method documentation")
                    .details(format!("You've documented {} out of {} methods with Javadoc, which aids maintainability.", documented, total)),
            )
        } else if coverage > 0.0 {
            Some(
                QualityFeedback::info(Category::Documentation, "Partial method documentation")
                    .details(format!("Only {} out of {} methods have Javadoc comments. Consider documenting all methods.", documented, total)),
            )
        } else {
            Some(
                QualityFeedback::warning(Category::Documentation, "Missing method documentation")
                    .details("None of your methods have Javadoc comments. Adding @param, @return and @throws tags improves readability."),
            )
        }
    }
}

pub struct InlineComments;

impl Rule for InlineComments {
    fn name(&self) -> &'static str {
        "inline-comments"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let ratio = f.inline_comments as f64 / f.line_count.max(1) as f64;
        if ratio > 0.15 {
            Some(
                QualityFeedback::success(Category::Documentation, "Good use of inline comments")
                    .details("Your code has a healthy amount of inline comments explaining implementation details."),
            )
        } else if ratio < 0.05 && f.line_count > 30 {
            Some(
                QualityFeedback::info(Category::Documentation, "Consider adding more inline comments")
                    .details("Complex sections could benefit from inline comments explaining the reasoning behind them."),
            )
        } else {
            None
        }
    }
}

pub struct MethodLength;

impl MethodLength {
    const LONG: usize = 30;
    const SHORT: usize = 20;
}

impl Rule for MethodLength {
    fn name(&self) -> &'static str {
        "method-length"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let lengths: Vec<usize> = f.method_lengths().collect();
        let long = lengths.iter().filter(|&&n| n > Self::LONG).count();

        if long > 0 {
            Some(
                QualityFeedback::warning(Category::Structure, "Methods are too long")
                    .details(format!("You have {} method(s) with more than {} lines. Consider breaking them into smaller, focused methods.", long, Self::LONG)),
            )
        } else if !lengths.is_empty() && lengths.iter().all(|&n| n < Self::SHORT) {
            Some(
                QualityFeedback::success(Category::Structure, "Well-sized methods")
                    .details("Your methods are concise and focused, which improves readability and maintainability."),
            )
        } else {
            None
        }
    }
}

pub struct Encapsulation;

impl Rule for Encapsulation {
    fn name(&self) -> &'static str {
        "encapsulation"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        match (f.private_fields, f.public_fields) {
            (0, public) if public > 0 => Some(
                QualityFeedback::warning(Category::Structure, "Poor encapsulation")
                    .details("You have public fields but no private fields. Make fields private and provide accessor methods."),
            ),
            (private, 0) if private > 0 => Some(
                QualityFeedback::success(Category::Structure, "Good encapsulation")
                    .details("Your fields are private with controlled access."),
            ),
            _ => None,
        }
    }
}

pub struct ObjectOrientation;

impl Rule for ObjectOrientation {
    fn name(&self) -> &'static str {
        "object-orientation"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let interfaces = f.contains("interface ") || f.contains("implements ");
        let inheritance = f.contains("extends ");
        let used = match (interfaces, inheritance) {
            (true, true) => "interfaces and inheritance",
            (true, false) => "interfaces",
            (false, true) => "inheritance",
            (false, false) => return None,
        };
        Some(
            QualityFeedback::success(Category::Design, "Good object-oriented design")
                .details(format!("You're using {} to create a flexible and extensible design.", used)),
        )
    }
}

pub struct ExceptionHandling;

impl Rule for ExceptionHandling {
    fn name(&self) -> &'static str {
        "exception-handling"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        if f.try_catch_blocks > 0 {
            if f.empty_catch_blocks > 0 {
                Some(
                    QualityFeedback::warning(Category::ErrorHandling, "Empty catch blocks")
                        .details(format!("You have {} empty catch block(s). They suppress exceptions and can hide errors.", f.empty_catch_blocks)),
                )
            } else {
                Some(
                    QualityFeedback::success(Category::ErrorHandling, "Good exception handling")
                        .details("Your code includes try-catch blocks that handle exceptions meaningfully."),
                )
            }
        } else if f.contains("throws ") {
            Some(
                QualityFeedback::info(Category::ErrorHandling, "Declared exceptions without handling")
                    .details("Your methods declare exceptions but never handle them. Consider try-catch blocks where recovery is possible."),
            )
        } else if f.method_decls > 1 {
            Some(
                QualityFeedback::info(Category::ErrorHandling, "Consider adding error handling")
                    .details("Your code has no exception handling. Consider try-catch blocks for operations that might fail."),
            )
        } else {
            None
        }
    }
}

pub struct InputValidation;

impl Rule for InputValidation {
    fn name(&self) -> &'static str {
        "input-validation"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        if f.method_decls == 0 {
            return None;
        }
        let null_checks = f.contains("null")
            && (f.contains("!= null") || f.contains("== null") || f.contains("null)"));
        if null_checks {
            Some(
                QualityFeedback::success(Category::Robustness, "Good input validation")
                    .details("Your code checks for null values, which helps prevent unexpected behavior."),
            )
        } else {
            Some(
                QualityFeedback::info(Category::Robustness, "Consider adding input validation")
                    .details("Your code could benefit from null checks and input validation."),
            )
        }
    }
}

pub struct NamingConvention;

impl Rule for NamingConvention {
    fn name(&self) -> &'static str {
        "naming-convention"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let (camel, snake) = (f.camel_idents, f.snake_idents);
        if snake > 2 && camel > 0 {
            Some(
                QualityFeedback::warning(Category::Style, "Inconsistent naming conventions")
                    .details("Your code mixes camelCase and snake_case. Stick to camelCase for Java variables and methods."),
            )
        } else if camel > 0 && snake == 0 {
            Some(
                QualityFeedback::success(Category::Style, "Consistent naming conventions")
                    .details("Your code follows camelCase naming, the Java standard."),
            )
        } else {
            None
        }
    }
}

pub struct Duplication;

impl Rule for Duplication {
    fn name(&self) -> &'static str {
        "duplication"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        (f.duplicate_windows > 0).then(|| {
            QualityFeedback::warning(Category::Style, "Potential code duplication")
                .details("Some code blocks appear more than once. Consider extracting common functionality into reusable methods.")
        })
    }
}

pub struct ModernFeatures;

impl Rule for ModernFeatures {
    fn name(&self) -> &'static str {
        "modern-features"
    }

    fn check(&self, f: &SourceFacts, _: &TestStats) -> Option<QualityFeedback> {
        let found: Vec<&str> = [
            ("Streams", f.contains(".stream()") || f.contains("Stream.")),
            ("Lambdas", f.contains("->")),
            ("Optionals", f.contains("Optional<") || f.contains("Optional.")),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        if found.is_empty() {
            return None;
        }
        Some(
            QualityFeedback::success(Category::ModernJava, "Using modern Java features")
                .details(format!("You're utilizing modern Java features like {}.", found.join(", "))),
        )
    }
}
