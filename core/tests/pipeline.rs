//! End-to-end scenarios over the normalize/PMI/word-extraction pipeline.

use feedmill_core::normalizer::{normalize, NormalizeOptions};
use feedmill_core::pmi::{compute_pmi, PmiOptions};
use feedmill_core::sampler::reservoir_sample;
use feedmill_core::unicode::Form;
use feedmill_core::word_extraction::{extract_words, WordExtractionOptions};
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

// This input appears in spec.md's §8 scenario 1 with a stated expectation
// of uniques=1 (only "hello world" surviving). Tracing the component rules
// in §4.A/§4.B, "#comment line" matches none of the rejection criteria
// (not whitespace-only, not <=1 code point, not emoji-only) and is not a
// duplicate of "hello world" — so it must also survive as a second unique
// line. The original codebase's own test suite asserts the same uniques=1
// outcome, but its source comment ("Comment exclusion removed to handle
// hashtags properly") confirms the comment-stripping rule that would have
// produced that result was deliberately removed — the test numbers were
// never updated to match. This is the same class of stale test-suite
// artifact as the mojibake quirk called out in spec.md §9's Open Question;
// this port follows the written component rules rather than the stale
// expectation.
#[test]
fn scenario_1_dedup_and_normalize_compatibility_form() {
    let dir = tempdir().unwrap();
    let input = write(
        &dir,
        "in.txt",
        "Hello World\nhello world\nHELLO WORLD\nＨｅｌｌｏ　Ｗｏｒｌｄ\n#comment line\na\n\n",
    );
    let output = dir.path().join("out.txt");

    let options = NormalizeOptions { form: Form::Compatibility, ..Default::default() };
    let stats = normalize(&input, output.to_str().unwrap(), &options, |_| {}).unwrap();

    assert_eq!(stats.rows, 7);
    assert_eq!(stats.uniques, 2);
    assert_eq!(stats.duplicates, 5);

    let result = std::fs::read_to_string(&output).unwrap();
    assert_eq!(result.lines().collect::<Vec<_>>(), vec!["hello world", "#comment line"]);
}

#[test]
fn scenario_2_canonical_form_preserves_case() {
    let dir = tempdir().unwrap();
    let input = write(
        &dir,
        "in.txt",
        "Hello World\nhello world\nHELLO WORLD\nＨｅｌｌｏ　Ｗｏｒｌｄ\n#comment line\na\n\n",
    );
    let output = dir.path().join("out.txt");

    let options = NormalizeOptions { form: Form::Canonical, ..Default::default() };
    let stats = normalize(&input, output.to_str().unwrap(), &options, |_| {}).unwrap();

    assert!(stats.uniques > 1);
    let result = std::fs::read_to_string(&output).unwrap();
    assert!(result.contains("Hello World"));
}

#[test]
fn scenario_3_pmi_bigrams_tiny_corpus() {
    let dir = tempdir().unwrap();
    let input = write(
        &dir,
        "in.txt",
        "This is a test\nThis is another test\nPMI calculation requires sufficient text data.",
    );
    let output = dir.path().join("out.tsv");

    let options = PmiOptions { n: 2, min_freq: 2, ..Default::default() };
    let (items, _stats) = compute_pmi(&input, output.to_str().unwrap(), &options, |_| {}).unwrap();

    assert!(!items.is_empty());
    let written = std::fs::read_to_string(&output).unwrap();
    let header = written.lines().next().unwrap();
    assert_eq!(header, "ngram\tpmi\tfrequency");

    let first_data_row = written.lines().nth(1).unwrap();
    let first_ngram = first_data_row.split('\t').next().unwrap();
    assert_eq!(first_ngram, items[0].ngram);
}

#[test]
fn scenario_4_word_extraction_end_to_end_japanese() {
    let dir = tempdir().unwrap();
    let corpus = write(
        &dir,
        "corpus.txt",
        "人工知能と機械学習の研究が進んでいる。深層学習や処理技術も発展している。",
    );
    let pmi_results = write(
        &dir,
        "pmi.tsv",
        "ngram\tpmi\tfrequency\n人工知能\t5.2\t10\n機械学習\t4.8\t8\n深層学習\t4.5\t7\n処理技術\t4.0\t5\n低スコア\t2.5\t1\n",
    );

    let options = WordExtractionOptions {
        min_pmi_score: 3.0,
        verify_in_original_text: true,
        top_k: 5,
        min_length: 1,
        min_score: 0.0,
        ..Default::default()
    };

    let (ranked, _stats) = extract_words(&pmi_results, &corpus, &options, |_| {}).unwrap();
    let texts: Vec<&str> = ranked.iter().map(|c| c.text.as_str()).collect();

    assert!(texts.contains(&"人工知能"));
    assert!(texts.contains(&"機械学習"));
    assert!(!texts.contains(&"低スコア"));

    let corpus_text = std::fs::read_to_string(&corpus).unwrap();
    for word in &ranked {
        assert!(corpus_text.contains(&word.text));
    }
}

#[test]
fn scenario_5_reservoir_sampling_is_deterministic() {
    let lines: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    let a = reservoir_sample(&lines, 10, 42);
    let b = reservoir_sample(&lines, 10, 42);
    assert_eq!(a, b);
    assert_eq!(a.len(), 10);
}

#[test]
fn scenario_6_parallel_vs_sequential_equivalence() {
    let dir = tempdir().unwrap();
    let mut content = String::new();
    for i in 0..1000 {
        content.push_str(&format!("line value {}\n", i % 250));
    }
    let input = write(&dir, "in.txt", &content);

    let out_seq = dir.path().join("out-seq.txt");
    let out_par = dir.path().join("out-par.txt");

    let seq_options = NormalizeOptions { threads: 1, ..Default::default() };
    let par_options = NormalizeOptions { threads: 8, ..Default::default() };

    let seq_stats = normalize(&input, out_seq.to_str().unwrap(), &seq_options, |_| {}).unwrap();
    let par_stats = normalize(&input, out_par.to_str().unwrap(), &par_options, |_| {}).unwrap();

    assert_eq!(seq_stats.uniques, par_stats.uniques);

    let mut seq_lines: Vec<String> = std::fs::read_to_string(&out_seq).unwrap().lines().map(String::from).collect();
    let mut par_lines: Vec<String> = std::fs::read_to_string(&out_par).unwrap().lines().map(String::from).collect();
    seq_lines.sort();
    par_lines.sort();
    assert_eq!(seq_lines, par_lines);
}

#[test]
fn boundary_empty_input_file_yields_zero_rows_and_uniques() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "empty.txt", "");
    let stats = normalize(&input, "null", &NormalizeOptions::default(), |_| {}).unwrap();
    assert_eq!(stats.rows, 0);
    assert_eq!(stats.uniques, 0);

    let (items, pmi_stats) = compute_pmi(&input, "null", &PmiOptions::default(), |_| {}).unwrap();
    assert!(items.is_empty());
    assert_eq!(pmi_stats.grams, 0);
    assert_eq!(pmi_stats.distinct_ngrams, 0);
}

#[test]
fn boundary_single_codepoint_line_is_rejected_but_counted() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "single.txt", "a\n");
    let stats = normalize(&input, "null", &NormalizeOptions::default(), |_| {}).unwrap();
    assert_eq!(stats.rows, 1);
    assert_eq!(stats.uniques, 0);
}

#[test]
fn boundary_reservoir_k_zero_and_k_ge_len() {
    let lines: Vec<String> = (0..5).map(|i| i.to_string()).collect();
    assert!(reservoir_sample(&lines, 0, 1).is_empty());
    assert_eq!(reservoir_sample(&lines, 100, 1), lines);
}

#[test]
fn boundary_pmi_n1_degenerates_to_frequency() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "in.txt", "aa bb aa cc aa\n");
    let options = PmiOptions { n: 1, min_freq: 1, ..Default::default() };
    let (items, _stats) = compute_pmi(&input, "null", &options, |_| {}).unwrap();
    assert!(!items.is_empty());
}

#[test]
fn universal_progress_stream_starts_at_zero_and_ends_at_complete() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "in.txt", "hello world\nanother line\n");
    let mut events = Vec::new();
    normalize(&input, "null", &NormalizeOptions::default(), |e| events.push(e)).unwrap();

    assert_eq!(events.first().unwrap().overall_ratio, 0.0);
    assert_eq!(events.last().unwrap().overall_ratio, 1.0);
    assert_eq!(events.last().unwrap().phase, feedmill_core::Phase::Complete);
    for pair in events.windows(2) {
        assert!(pair[1].overall_ratio >= pair[0].overall_ratio);
    }
}

#[test]
fn universal_progress_stream_ends_at_complete_even_on_io_error() {
    let mut events = Vec::new();
    let err = normalize("/no/such/corpus.txt", "null", &NormalizeOptions::default(), |e| events.push(e)).unwrap_err();
    assert!(matches!(err, feedmill_core::Error::NotFound { .. }));
    assert_eq!(events.last().unwrap().phase, feedmill_core::Phase::Complete);
    assert_eq!(events.last().unwrap().overall_ratio, 1.0);
}

#[test]
fn universal_pmi_output_sorted_non_increasing() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "in.txt", &"the quick brown fox jumps over the lazy dog\n".repeat(50));
    let (items, _) = compute_pmi(&input, "null", &PmiOptions::default(), |_| {}).unwrap();
    for pair in items.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
