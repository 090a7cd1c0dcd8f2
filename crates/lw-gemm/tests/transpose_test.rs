//! Randomized agreement with the reference GEMM over all transpose flags.

mod common;

use approx::assert_relative_eq;
use common::*;
use lw_gemm::GemmAttributes;
use rand::Rng;

#[test]
fn test_random_shapes_match_reference() {
    let mut rng = seeded(0x6e6d);
    for _ in 0..24 {
        let (n, k, m) = (
            rng.gen_range(1..6),
            rng.gen_range(1..6),
            rng.gen_range(1..6),
        );
        let attrs = GemmAttributes {
            alpha: rng.gen_range(-2.0..2.0),
            beta: rng.gen_range(-2.0..2.0),
            trans_a: rng.gen_bool(0.5),
            trans_b: rng.gen_bool(0.5),
        };
        let a_dims = if attrs.trans_a { [k, n] } else { [n, k] };
        let b_dims = if attrs.trans_b { [m, k] } else { [k, m] };
        let a = random_tensor(&mut rng, &a_dims);
        let b = random_tensor(&mut rng, &b_dims);
        let c_dims: &[usize] = match rng.gen_range(0..4) {
            0 => &[],
            1 => &[1, 1],
            2 => &[n, 1],
            _ => &[1, m],
        };
        let c = random_tensor(&mut rng, c_dims);

        let y = run_gemm(&a, &b, Some(&c), attrs);
        let want = reference(&a, &b, Some(&c), attrs);
        assert_eq!(y.shape(), want.shape(), "{:?}", attrs);
        for (got, want) in y.to_f32_vec().iter().zip(want.to_f32_vec()) {
            assert_relative_eq!(*got, want, epsilon = 1e-4);
        }
    }
}

#[test]
fn test_transposing_operands_is_equivalent() {
    let mut rng = seeded(99);
    let a = random_tensor(&mut rng, &[3, 4]);
    let b = random_tensor(&mut rng, &[4, 2]);
    let plain = run_gemm(&a, &b, None, GemmAttributes::default());

    let at = a.transpose().unwrap();
    let bt = b.transpose().unwrap();
    let attrs = GemmAttributes {
        trans_a: true,
        trans_b: true,
        ..GemmAttributes::default()
    };
    let flipped = run_gemm(&at, &bt, None, attrs);
    assert_eq!(plain.to_f32_vec(), flipped.to_f32_vec());
}
