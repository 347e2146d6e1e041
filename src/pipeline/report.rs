//! Report rendering: per-file word statistics and the aggregate summary.
//!
//! Both layouts are plain UTF-8 lines joined with `\n` and no trailing
//! newline. Rendering is a pure function of its inputs, so re-rendering the
//! same data always yields byte-identical text.

use crate::output::{FileSummary, RunTotals};
use crate::pipeline::tokenize::WordFrequency;

/// Render the report for one image.
///
/// ```text
/// File: <file name>
/// Total Words: <word count>
/// Unique Words: <unique count>
///
/// Word Frequency:
/// <word>: <count>
/// ```
///
/// Frequency lines are ordered by descending count; equal counts keep the
/// order in which the words were first seen.
pub fn render_file_report(summary: &FileSummary, frequency: &WordFrequency) -> String {
    let mut lines = vec![
        format!("File: {}", summary.file_name),
        format!("Total Words: {}", summary.word_count),
        format!("Unique Words: {}", summary.unique_words),
        String::new(),
        "Word Frequency:".to_string(),
    ];
    lines.extend(
        frequency
            .sorted_by_count()
            .into_iter()
            .map(|(word, count)| format!("{word}: {count}")),
    );
    lines.join("\n")
}

/// Render the aggregate summary for a whole run, files in processing order.
pub fn render_summary(summaries: &[FileSummary], totals: &RunTotals) -> String {
    let mut lines = vec![
        "OCR Processing Summary".to_string(),
        format!("Total Files Processed: {}", totals.file_count),
        format!("Total Words Across All Files: {}", totals.total_words),
        String::new(),
        "Individual File Summary:".to_string(),
    ];
    lines.extend(summaries.iter().map(|s| {
        format!(
            "{}: {} words ({} unique)",
            s.file_name, s.word_count, s.unique_words
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tokenize::analyze_text;

    fn summary_for(name: &str, text: &str) -> (FileSummary, WordFrequency) {
        let stats = analyze_text(text);
        let summary = FileSummary {
            file_name: name.to_string(),
            word_count: stats.word_count,
            unique_words: stats.unique_words(),
        };
        (summary, stats.frequency)
    }

    #[test]
    fn file_report_layout() {
        let (summary, freq) = summary_for("page1.png", "b a a c b a");
        let report = render_file_report(&summary, &freq);
        assert_eq!(
            report,
            "File: page1.png\n\
             Total Words: 6\n\
             Unique Words: 3\n\
             \n\
             Word Frequency:\n\
             a: 3\n\
             b: 2\n\
             c: 1"
        );
    }

    #[test]
    fn empty_file_report() {
        let (summary, freq) = summary_for("blank.png", "");
        let report = render_file_report(&summary, &freq);
        assert_eq!(
            report,
            "File: blank.png\nTotal Words: 0\nUnique Words: 0\n\nWord Frequency:"
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let (summary, freq) = summary_for("t.png", "pear fig pear kiwi fig");
        let report = render_file_report(&summary, &freq);
        let tail: Vec<&str> = report.lines().skip(5).collect();
        assert_eq!(tail, vec!["pear: 2", "fig: 2", "kiwi: 1"]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let (summary, freq) = summary_for("d.png", "one two three two one four");
        assert_eq!(
            render_file_report(&summary, &freq),
            render_file_report(&summary, &freq)
        );
    }

    #[test]
    fn summary_layout_preserves_processing_order() {
        let summaries = vec![
            FileSummary {
                file_name: "b.png".into(),
                word_count: 2,
                unique_words: 2,
            },
            FileSummary {
                file_name: "a.png".into(),
                word_count: 10,
                unique_words: 7,
            },
        ];
        let totals = summaries
            .iter()
            .fold(RunTotals::default(), |t, s| t.with_file(s));
        assert_eq!(
            render_summary(&summaries, &totals),
            "OCR Processing Summary\n\
             Total Files Processed: 2\n\
             Total Words Across All Files: 12\n\
             \n\
             Individual File Summary:\n\
             b.png: 2 words (2 unique)\n\
             a.png: 10 words (7 unique)"
        );
    }
}
