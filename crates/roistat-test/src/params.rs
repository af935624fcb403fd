//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use roistat_core::RoiStatistics;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare with expected values (default)
    #[default]
    Compare,
    /// Display mode - print every checked value, fail nothing
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "roistat")
    pub test_name: String,
    /// Current test index (incremented before each check)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<TestError>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if self.display() {
            eprintln!(
                "{}_reg index {}: expected = {}, actual = {}",
                self.test_name, self.index, expected, actual
            );
            return true;
        }

        if diff > delta {
            let failure = TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            };
            eprintln!("Failure in {}_reg: {}", self.test_name, failure);
            self.failures.push(failure);
            self.success = false;
            false
        } else {
            true
        }
    }

    /// Compare all fields of two statistics records
    ///
    /// Uses one index per field (min, max, mean, total, element count).
    ///
    /// # Returns
    ///
    /// `true` if every field matches within delta.
    pub fn compare_stats(
        &mut self,
        expected: &RoiStatistics,
        actual: &RoiStatistics,
        delta: f64,
    ) -> bool {
        let results = [
            self.compare_values(expected.min, actual.min, delta),
            self.compare_values(expected.max, actual.max, delta),
            self.compare_values(expected.mean, actual.mean, delta),
            self.compare_values(expected.total, actual.total, delta),
            self.compare_values(
                expected.num_elements as f64,
                actual.num_elements as f64,
                0.0,
            ),
        ];
        results.iter().all(|&ok| ok)
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all checks passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Clean up and convert the outcome into a `Result`
    pub fn finish(self) -> TestResult<()> {
        let test_name = self.test_name.clone();
        let count = self.failures.len();
        if self.cleanup() {
            Ok(())
        } else {
            Err(TestError::Failed { test_name, count })
        }
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[TestError] {
        &self.failures
    }
}
