//! Small helpers for moving between DNA and RNA representations of a sequence.
//!
//! All functions keep the case of each base. Characters outside the
//! nucleotide alphabet are passed through untouched.

fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'U' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'u' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

fn to_rna(base: char) -> char {
    match base {
        'T' => 'U',
        't' => 'u',
        other => other,
    }
}

fn to_dna(base: char) -> char {
    match base {
        'U' => 'T',
        'u' => 't',
        other => other,
    }
}

/// Reverse complement of a DNA or RNA sequence. `U` pairs with `A`, and `A` always becomes `T`.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement).collect()
}

/// RNA transcribed from `seq` read as the template strand.
pub fn transcribe(seq: &str) -> String {
    seq.chars().rev().map(|b| to_rna(complement(b))).collect()
}

/// DNA reverse transcribed from an RNA sequence.
pub fn reverse_transcribe(seq: &str) -> String {
    seq.chars().rev().map(|b| to_dna(complement(b))).collect()
}

pub fn dna_to_rna(seq: &str) -> String {
    seq.chars().map(to_rna).collect()
}

pub fn rna_to_dna(seq: &str) -> String {
    seq.chars().map(to_dna).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("ATCG", "CGAT")]
    #[case("AUCG", "CGAT")]
    #[case("aTcN", "NgAt")]
    fn test_reverse_complement(#[case] seq: &str, #[case] expected: &str) {
        assert_eq!(reverse_complement(seq), expected);
    }

    #[rstest]
    fn test_transcription() {
        // let-7a mature sequence and its DNA template
        let mature = "UGAGGUAGUAGGUUGUAUAGUU";
        let template = "AACTATACAACCTACTACCTCA";

        assert_eq!(transcribe(template), mature);
        assert_eq!(reverse_transcribe(mature), template);
    }

    #[rstest]
    fn test_direct_conversion() {
        assert_eq!(dna_to_rna("ACGTacgt"), "ACGUacgu");
        assert_eq!(rna_to_dna("ACGUacgu"), "ACGTacgt");
    }
}
