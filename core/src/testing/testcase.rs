use serde::{Deserialize, Serialize};

/// One input/expected-output pair (or an error-only check) of a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Whether the case is shown to the person taking the assessment.
    #[serde(default = "TestCase::default_visible")]
    pub visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

impl TestCase {
    fn default_visible() -> bool {
        true
    }

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            visible: true,
            input: None,
            expected_output: None,
        }
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// Input to feed as stdin. An empty fixture counts as no fixture.
    pub fn stdin_fixture(&self) -> Option<&str> {
        self.input.as_deref().filter(|s| !s.is_empty())
    }

    /// Expected stdout. An empty string counts as undeclared.
    pub fn expected(&self) -> Option<&str> {
        self.expected_output.as_deref().filter(|s| !s.is_empty())
    }

    /// File name of the stdin fixture inside a workspace.
    ///
    /// ```
    /// use assay_core::testing::TestCase;
    ///
    /// assert_eq!(TestCase::new("3", "x").fixture_filename(), "input_3.txt");
    /// assert_eq!(TestCase::new("../etc", "x").fixture_filename(), "input____etc.txt");
    /// ```
    pub fn fixture_filename(&self) -> String {
        let id: String = self
            .id
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        format!("input_{}.txt", id)
    }
}
