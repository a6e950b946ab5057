use super::cigar::{expand, normalize, trim_deletion_flanks};
use super::coords::CoordFormat;
use super::dispatch::Aligner;
use super::encode::{decode_nt4, encode_nt4, nt4, EncodedSeq, AMBIGUOUS};
use super::kernels::scalar_ref::{global_traceback, local_score, score_cigar};
use super::kernels::Gaps;
use super::matrix::ScoringMatrix;
use super::types::{AlignmentParams, AlignmentResult, Cigar, CigarOp, Extent, Mode, Span};
use super::validate::validate;
use super::workspace::Workspace;

use proptest::prelude::*;

fn dna(s: &[u8]) -> EncodedSeq {
    encode_nt4(s)
}

fn aligner(mode: Mode, backend: Option<&str>) -> Aligner {
    let params = AlignmentParams::default();
    let matrix = ScoringMatrix::build(params.match_score as i8, params.mismatch as i8);
    Aligner::new(matrix, validate(mode as i32, backend, params).unwrap())
}

fn align(a: &mut Aligner, q: &[u8], t: &[u8]) -> AlignmentResult {
    a.align(&dna(q), &dna(t), true).unwrap()
}

fn default_gaps() -> Gaps {
    Gaps::new(5, 2)
}

/// Score of `cigar` over the window its extent covers.
fn rescore(q: &[u8], t: &[u8], res: &AlignmentResult) -> i32 {
    let ext = res.extent.expect("rescore needs an extent");
    let (qc, tc) = (dna(q), dna(t));
    score_cigar(
        &qc.codes()[ext.query.begin..=ext.query.end],
        &tc.codes()[ext.target.begin..=ext.target.end],
        &res.cigar.as_ref().expect("rescore needs a cigar").ops,
        &ScoringMatrix::build(1, 3),
        default_gaps(),
    )
}

fn bases(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
        1..max,
    )
}

fn ops() -> impl Strategy<Value = Vec<CigarOp>> {
    prop::collection::vec(
        prop_oneof![
            Just(CigarOp::Match),
            Just(CigarOp::Ins),
            Just(CigarOp::Del)
        ],
        0..60,
    )
}

#[test]
fn encode_maps_case_and_ambiguity() {
    let enc = dna(b"ACGTacgtNxR-");
    assert_eq!(&enc.codes()[..8], &[0, 1, 2, 3, 0, 1, 2, 3]);
    assert!(enc.codes()[8..].iter().all(|&c| c == AMBIGUOUS));
    assert_eq!(nt4(b'\n'), AMBIGUOUS);
    assert_eq!(decode_nt4(enc.codes()), "ACGTACGTNNNN");
    assert_eq!(EncodedSeq::from_codes(vec![0, 9]).codes(), &[0, AMBIGUOUS]);
}

// ---- Known-answer tests ----

#[test]
fn global_identical_pair() {
    for backend in ["banded", "vectorized"] {
        let mut a = aligner(Mode::Global, Some(backend));
        let res = align(&mut a, b"ACGT", b"ACGT");
        assert_eq!(res.score, 4, "{backend}");
        assert_eq!(
            CoordFormat::StartEnd.format(res.extent),
            [0, 3, 0, 3],
            "{backend}"
        );
        assert_eq!(res.cigar.unwrap().to_string(), "4M", "{backend}");
    }
}

#[test]
fn global_single_gap() {
    // The extra query base is an insertion: it consumes query only.
    for backend in ["banded", "vectorized"] {
        let mut a = aligner(Mode::Global, Some(backend));
        let res = align(&mut a, b"ACGT", b"AGT");
        assert_eq!(res.score, 3 - (5 + 2), "{backend}");
        assert_eq!(res.cigar.unwrap().to_string(), "1M1I2M", "{backend}");
    }
}

#[test]
fn glocal_flanks_trimmed() {
    let mut global = aligner(Mode::Global, None);
    let raw = align(&mut global, b"CGT", b"ACGTA");
    assert_eq!(raw.cigar.unwrap().to_string(), "1D3M1D");

    let mut a = aligner(Mode::Glocal, None);
    let res = align(&mut a, b"CGT", b"ACGTA");
    assert_eq!(CoordFormat::StartEnd.format(res.extent), [0, 2, 1, 3]);
    assert_eq!(res.score, raw.score + 2 * (5 + 2));
    assert_eq!(res.cigar.unwrap().to_string(), "3M");
}

#[test]
fn extension_without_positive_prefix() {
    let mut a = aligner(Mode::Extension, None);
    let res = align(&mut a, b"AAAA", b"CCCC");
    assert_eq!(res.extent, None);
    assert_eq!(CoordFormat::StartEnd.format(res.extent), [-1; 4]);
    assert_eq!(CoordFormat::OffsetLength.format(res.extent), [-1; 4]);
    // Best score with the query fully consumed.
    assert_eq!(res.score, -12);
}

#[test]
fn extension_reaches_shared_prefix() {
    let mut a = aligner(Mode::Extension, None);
    let res = align(&mut a, b"ACGTTTTT", b"ACGTAAAA");
    assert_eq!(res.score, 4);
    assert_eq!(CoordFormat::StartEnd.format(res.extent), [0, 3, 0, 3]);
    assert_eq!(res.cigar.unwrap().to_string(), "4M");
}

#[test]
fn local_with_ambiguous_bases() {
    let mut a = aligner(Mode::Local, None);
    let res = align(&mut a, b"NNACGTNN", b"ACGT");
    assert_eq!(res.score, 4);
    assert_eq!(CoordFormat::StartEnd.format(res.extent), [2, 5, 0, 3]);
    assert_eq!(CoordFormat::OffsetLength.format(res.extent), [2, 4, 0, 4]);
}

#[test]
fn local_gapped_rescore() {
    let q = b"TTTTACGTACGTACGTACGTTTTT";
    let t = b"GGACGTACGTAACGTACGTGG";
    let mut a = aligner(Mode::Local, None);
    let res = align(&mut a, q, t);
    assert!(res.score > 0);
    assert_eq!(rescore(q, t, &res), res.score);
}

#[test]
fn full_scalar_kernels_agree_on_identity() {
    let q = dna(b"ACGTACGTAC");
    let mat = ScoringMatrix::build(1, 3);
    let mut ws = Workspace::new();
    let (local, qe, te) = local_score(q.codes(), q.codes(), &mat, default_gaps(), &mut ws);
    let global = global_traceback(q.codes(), q.codes(), &mat, default_gaps(), &mut ws);
    assert_eq!((local, qe, te), (10, 9, 9));
    assert_eq!(global, 10);
    assert_eq!(normalize(&ws.ops).to_string(), "10M");
}

#[test]
fn matrix_drives_alignment() {
    // A and G score as matches under this matrix.
    let text = "1,-3,1,-3,0\n-3,1,-3,-3,0\n1,-3,1,-3,0\n-3,-3,-3,1,0\n0,0,0,0,0\n";
    let matrix = ScoringMatrix::from_reader(text.as_bytes()).unwrap();
    let config = validate(3, None, AlignmentParams::default()).unwrap();
    let mut a = Aligner::new(matrix, config);
    let res = a.align(&dna(b"AAAA"), &dna(b"GGGG"), false).unwrap();
    assert_eq!(res.score, 4);
}

proptest! {
    #[test]
    fn matrix_build_layout(m in 1i8..=20, x in 1i8..=20) {
        let mat = ScoringMatrix::build(m, x);
        for a in 0..5u8 {
            for b in 0..5u8 {
                let want = if a == 4 || b == 4 {
                    0
                } else if a == b {
                    m as i32
                } else {
                    -(x as i32)
                };
                prop_assert_eq!(mat.score(a, b), want);
            }
        }
    }

    #[test]
    fn normalize_is_canonical(raw in ops()) {
        let cigar = normalize(&raw);
        for pair in cigar.ops.windows(2) {
            prop_assert_ne!(pair[0].0, pair[1].0);
        }
        prop_assert!(cigar.ops.iter().all(|&(_, len)| len > 0));
        prop_assert_eq!(cigar.len(), raw.len());
        prop_assert_eq!(normalize(&expand(&cigar)), cigar);
    }

    #[test]
    fn offset_length_round_trips(qb in 0usize..1000, ql in 1usize..1000, tb in 0usize..1000, tl in 1usize..1000) {
        let ext = Extent {
            query: Span::new(qb, qb + ql - 1),
            target: Span::new(tb, tb + tl - 1),
        };
        let [qo, qn, to, tn] = CoordFormat::OffsetLength.format(Some(ext));
        let start_end = CoordFormat::StartEnd.format(Some(ext));
        prop_assert_eq!([qo, qo + qn - 1, to, to + tn - 1], start_end);
    }

    #[test]
    fn glocal_is_global_minus_flanks(q in bases(20), t in bases(40)) {
        let mut global = aligner(Mode::Global, None);
        let mut glocal = aligner(Mode::Glocal, None);
        let raw = align(&mut global, &q, &t);
        let res = align(&mut glocal, &q, &t);

        let mut cigar = raw.cigar.clone().unwrap();
        let trim = trim_deletion_flanks(&mut cigar);
        let runs = [trim.leading, trim.trailing].iter().filter(|&&l| l > 0).count() as i32;
        let expected = raw.score + 5 * runs + 2 * (trim.leading + trim.trailing) as i32;
        prop_assert_eq!(res.score, expected);
        prop_assert_eq!(res.cigar.as_ref(), Some(&cigar));
        if let Some(ext) = res.extent {
            prop_assert_eq!((ext.query.begin, ext.query.end), (0, q.len() - 1));
            prop_assert_eq!(ext.target.begin, trim.leading);
            prop_assert_eq!(ext.target.end, t.len() - 1 - trim.trailing);
            prop_assert_eq!(rescore(&q, &t, &res), res.score);
        }
    }

    #[test]
    fn global_cigar_rescores_on_both_backends(q in bases(30), t in bases(30)) {
        let mut banded = aligner(Mode::Global, Some("banded"));
        let mut vectorized = aligner(Mode::Global, Some("vectorized"));
        let b = align(&mut banded, &q, &t);
        let v = align(&mut vectorized, &q, &t);
        prop_assert_eq!(b.score, v.score);
        prop_assert_eq!(rescore(&q, &t, &b), b.score);
        prop_assert_eq!(rescore(&q, &t, &v), v.score);
        prop_assert_eq!(b.cigar.unwrap().consumed(), (q.len(), t.len()));
    }

    #[test]
    fn local_cross_check_holds(q in bases(40), t in bases(40)) {
        let mut a = aligner(Mode::Local, None);
        let res = a.align(&dna(&q), &dna(&t), true);
        prop_assert!(res.is_ok(), "{:?}", res);
        let res = res.unwrap();
        if res.extent.is_some() {
            prop_assert_eq!(rescore(&q, &t, &res), res.score);
        } else {
            prop_assert_eq!(res.score, 0);
            prop_assert_eq!(res.cigar, Some(Cigar::default()));
        }
    }

    #[test]
    fn extension_cigar_covers_reached_prefix(q in bases(30), t in bases(30)) {
        let mut a = aligner(Mode::Extension, None);
        let res = a.align(&dna(&q), &dna(&t), true).unwrap();
        if let Some(ext) = res.extent {
            prop_assert_eq!((ext.query.begin, ext.target.begin), (0, 0));
            prop_assert!(res.score > 0);
            prop_assert_eq!(rescore(&q, &t, &res), res.score);
        }
    }

    #[test]
    fn score_only_matches_traceback(q in bases(40), t in bases(40)) {
        for mode in [Mode::Local, Mode::Global] {
            let mut a = aligner(mode, None);
            let with = a.align(&dna(&q), &dna(&t), true).unwrap();
            let without = a.align(&dna(&q), &dna(&t), false).unwrap();
            prop_assert_eq!(with.score, without.score);
            prop_assert_eq!(with.extent, without.extent);
        }
    }
}

#[cfg(feature = "simd")]
proptest! {
    #[test]
    fn local_simd_matches_scalar(q in bases(60), t in bases(60)) {
        let (q, t) = (dna(&q), dna(&t));
        let mat = ScoringMatrix::build(1, 3);
        let mut ws = Workspace::new();
        let scalar = local_score(q.codes(), t.codes(), &mat, default_gaps(), &mut ws);
        let simd = super::kernels::local_simd::align_local_score(q.codes(), t.codes(), &mat, default_gaps());
        prop_assert_eq!(simd, scalar);
    }

    #[test]
    fn global_simd_matches_scalar(q in bases(60), t in bases(60)) {
        let (q, t) = (dna(&q), dna(&t));
        let mat = ScoringMatrix::build(2, 3);
        let gaps = Gaps::new(3, 1);
        let mut ws = Workspace::new();
        let scalar = global_traceback(q.codes(), t.codes(), &mat, gaps, &mut ws);
        let simd = super::kernels::global_simd::align_global_score(q.codes(), t.codes(), &mat, gaps);
        prop_assert_eq!(simd, scalar);
    }
}
