use controls_core::sources::manifest::{
    render_source_hashes_csv, sha256_hex, DocumentOrigin, SourceHashRow,
};

fn row(source_id: &str, file_name: &str, body: &[u8], origin: DocumentOrigin) -> SourceHashRow {
    SourceHashRow {
        source_id: source_id.to_string(),
        file_name: file_name.to_string(),
        sha256: sha256_hex(body),
        bytes: body.len() as u64,
        origin,
    }
}

#[test]
fn source_hashes_csv_is_sorted_by_source_id() {
    let csv = render_source_hashes_csv(vec![
        row("nist_controls", "sp800-171r2-security-reqs.csv", b"c", DocumentOrigin::NETWORK),
        row("dod_scores", "NIST-SP-800-171-Assessment-Methodology.pdf", b"pdf", DocumentOrigin::CACHE),
        row("nist_assessments", "sp800-171a-procedures.csv", b"a", DocumentOrigin::CACHE),
    ])
    .unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "source_id,file_name,sha256,bytes,origin");
    assert!(lines[1].starts_with("dod_scores,"));
    assert!(lines[2].starts_with("nist_assessments,"));
    assert!(lines[3].starts_with("nist_controls,"));
    assert!(lines[3].ends_with(",1,NETWORK"));
    assert!(!csv.contains('\r'));
}

#[test]
fn sha256_matches_known_digest() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
