//! Classify command implementation

use crate::cli::output::format_classification;
use crate::inference::classify;

/// Handle the classify command
pub fn handle_classify(values: &[String]) {
    for value in values {
        println!("{}", format_classification(value, &classify(value)));
    }
}
