//! HDC primitives: the algebra behind encoding and finalization.
//!
//! - **bind**: element-wise product, associates an identifier with a level
//! - **bundle**: element-wise sum, superposes bound pairs into one row
//! - **sign**: collapses an accumulator to bipolar {-1, +1}
//!
//! Bundling here never thresholds. Encoded rows and class prototypes keep
//! their integer magnitudes; binarization happens once, at the prototype
//! level, through [`Primitives::binarize_in_place`].

use crate::vector::Hypervector;

/// Collection of HDC primitive operations.
pub struct Primitives;

impl Primitives {
    /// Bind two bipolar vectors (element-wise multiplication).
    ///
    /// The result is dissimilar to both inputs. Binding is commutative and
    /// self-inverse: `bind(bind(a, b), a) == b`.
    pub fn bind(a: &Hypervector, b: &Hypervector) -> Hypervector {
        assert_eq!(
            a.dimensions(),
            b.dimensions(),
            "Dimension mismatch in bind"
        );

        let data: Vec<i8> = a
            .data()
            .iter()
            .zip(b.data().iter())
            .map(|(&x, &y)| x * y)
            .collect();

        Hypervector::from_data(data)
    }

    /// Bind `a` with `b` and bundle the result into `acc`.
    ///
    /// Equivalent to `bundle_into(acc, &bind(a, b))` without the
    /// intermediate allocation; this is the encoder's inner loop.
    pub fn bind_into(acc: &mut [i32], a: &Hypervector, b: &Hypervector) {
        assert_eq!(a.dimensions(), b.dimensions(), "Dimension mismatch in bind");
        assert_eq!(acc.len(), a.dimensions(), "Dimension mismatch in bundle");

        for ((slot, &x), &y) in acc.iter_mut().zip(a.data()).zip(b.data()) {
            *slot += (x * y) as i32;
        }
    }

    /// Bundle a vector into an accumulator (element-wise sum).
    pub fn bundle_into(acc: &mut [i32], vec: &Hypervector) {
        assert_eq!(acc.len(), vec.dimensions(), "Dimension mismatch in bundle");

        for (slot, &v) in acc.iter_mut().zip(vec.data()) {
            *slot += v as i32;
        }
    }

    /// Bundle multiple vectors by element-wise sum, without thresholding.
    pub fn bundle(vectors: &[&Hypervector]) -> Vec<i32> {
        if vectors.is_empty() {
            panic!("Cannot bundle empty vector list");
        }

        let mut sums = vec![0i32; vectors[0].dimensions()];
        for vec in vectors {
            Self::bundle_into(&mut sums, vec);
        }
        sums
    }

    /// Sign of a single accumulator element; zero maps to +1.
    #[inline]
    pub fn sign(v: i64) -> i64 {
        if v < 0 {
            -1
        } else {
            1
        }
    }

    /// Replace every element with its sign, in place.
    ///
    /// Idempotent: a second application leaves the data unchanged.
    pub fn binarize_in_place(values: &mut [i64]) {
        for v in values.iter_mut() {
            *v = Self::sign(*v);
        }
    }
}
