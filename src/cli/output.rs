//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::Sequence;

/// Symbols per FASTA line.
pub const FASTA_WIDTH: usize = 60;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print completed action (green label) to stderr, keeping stdout for data
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Format one FASTA record; the sequence's own info line follows the name.
pub fn fasta_record(name: &str, sequence: &Sequence) -> String {
    let mut out = String::with_capacity(sequence.len() + sequence.len() / FASTA_WIDTH + 64);
    match sequence.info() {
        Some(info) => out.push_str(&format!(">{} {}\n", name, info)),
        None => out.push_str(&format!(">{}\n", name)),
    }
    for line in sequence.as_bytes().chunks(FASTA_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out
}

/// Print one FASTA record (no color, for data)
pub fn fasta(name: &str, sequence: &Sequence) {
    print!("{}", fasta_record(name, sequence));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_long_sequence_when_formatting_fasta_then_wraps_lines() {
        let sequence = Sequence::from("A".repeat(FASTA_WIDTH + 5));
        let record = fasta_record("n1", &sequence);
        let lines: Vec<&str> = record.lines().collect();
        assert_eq!(lines[0], ">n1");
        assert_eq!(lines[1].len(), FASTA_WIDTH);
        assert_eq!(lines[2], "AAAAA");
    }

    #[test]
    fn given_sequence_with_info_when_formatting_fasta_then_keeps_info() {
        let sequence = Sequence::from("ATGC").with_info("chr1 sample");
        assert_eq!(fasta_record("root", &sequence), ">root chr1 sample\nATGC\n");
    }

    #[test]
    fn given_empty_sequence_when_formatting_fasta_then_header_only() {
        assert_eq!(fasta_record("x", &Sequence::default()), ">x\n");
    }
}
