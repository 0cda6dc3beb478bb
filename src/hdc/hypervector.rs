//! Hypervector type and the algebra over it.
//!
//! A hypervector is a fixed-length vector over a two-symbol alphabet, stored
//! as an `ndarray::Array1<i8>`. Two alphabets are supported:
//! - **Binary** `{0, 1}`: binding is XOR, bundling is strict majority
//! - **Bipolar** `{-1, +1}`: binding is multiplication, bundling is sign of sum
//!
//! Similarity is cosine over the components cast to `f64`.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::HdcError;

/// Component alphabet of every hypervector in one process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Binary,
    Bipolar,
}

impl Encoding {
    /// The two symbols of the alphabet, "low" first.
    pub fn alphabet(&self) -> [i8; 2] {
        match self {
            Encoding::Binary => [0, 1],
            Encoding::Bipolar => [-1, 1],
        }
    }

    /// Whether `value` is a symbol of this alphabet.
    pub fn contains(&self, value: i8) -> bool {
        self.alphabet().contains(&value)
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i8 {
        let [low, high] = self.alphabet();
        if rng.gen::<bool>() {
            high
        } else {
            low
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Encoding::Binary),
            "bipolar" => Ok(Encoding::Bipolar),
            other => Err(format!("unsupported encoding '{other}' (expected binary|bipolar)")),
        }
    }
}

/// Dimensionality plus encoding: everything needed to create or validate a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorSpace {
    pub dimensionality: usize,
    pub encoding: Encoding,
}

impl VectorSpace {
    /// Space of `dimensionality`-component vectors over `encoding`.
    pub fn new(dimensionality: usize, encoding: Encoding) -> Self {
        Self {
            dimensionality,
            encoding,
        }
    }

    /// Draw a random member of this space.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Hypervector {
        generate_random(self.dimensionality, self.encoding, rng)
    }

    /// The neutral all-zero vector (also the result of bundling nothing).
    pub fn zeros(&self) -> Hypervector {
        Hypervector {
            components: Array1::zeros(self.dimensionality),
            encoding: self.encoding,
        }
    }

    /// Fails unless `hv` has this space's length and encoding.
    pub fn check(&self, hv: &Hypervector) -> Result<(), HdcError> {
        if hv.len() != self.dimensionality {
            return Err(HdcError::dimension_mismatch(self.dimensionality, hv.len()));
        }
        if hv.encoding != self.encoding {
            return Err(HdcError::EncodingMismatch {
                expected: self.encoding,
                actual: hv.encoding,
            });
        }
        Ok(())
    }
}

/// A single hypervector.
#[derive(Clone, PartialEq, Eq)]
pub struct Hypervector {
    components: Array1<i8>,
    encoding: Encoding,
}

impl Hypervector {
    /// Build from raw components, validating each against the alphabet.
    pub fn from_vec(encoding: Encoding, components: Vec<i8>) -> Result<Self, HdcError> {
        if let Some((index, &value)) = components
            .iter()
            .enumerate()
            .find(|(_, &v)| !encoding.contains(v))
        {
            return Err(HdcError::InvalidComponent {
                value,
                index,
                encoding,
            });
        }
        Ok(Self {
            components: Array1::from(components),
            encoding,
        })
    }

    /// Dimensionality.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for a zero-length vector.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Alphabet the components are drawn from.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Read-only view of the raw components.
    pub fn components(&self) -> ArrayView1<'_, i8> {
        self.components.view()
    }

    /// True when every component is 0 (the neutral vector).
    pub fn is_zero(&self) -> bool {
        self.components.iter().all(|&c| c == 0)
    }

    /// Number of components holding the alphabet's "high" symbol (+1 / 1).
    pub fn positives(&self) -> usize {
        self.components.iter().filter(|&&c| c > 0).count()
    }

    /// Method form of [`bind`].
    pub fn bind(&self, other: &Hypervector) -> Result<Hypervector, HdcError> {
        bind(self, other)
    }

    /// Method form of [`similarity`].
    pub fn similarity(&self, other: &Hypervector) -> Result<f64, HdcError> {
        similarity(self, other)
    }

    /// Method form of [`permute`].
    pub fn permute(&self, n: usize, inverse: bool) -> Hypervector {
        permute(self, n, inverse)
    }
}

impl fmt::Debug for Hypervector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hypervector(dim={}, encoding={:?}, positives={})",
            self.len(),
            self.encoding,
            self.positives()
        )
    }
}

fn check_compatible(a: &Hypervector, b: &Hypervector) -> Result<(), HdcError> {
    VectorSpace::new(a.len(), a.encoding).check(b)
}

/// Draw every component independently and uniformly from the alphabet.
pub fn generate_random<R: Rng + ?Sized>(
    dimensionality: usize,
    encoding: Encoding,
    rng: &mut R,
) -> Hypervector {
    let components = Array1::from_shape_fn(dimensionality, |_| encoding.draw(&mut *rng));
    Hypervector {
        components,
        encoding,
    }
}

/// Self-inverse association: XOR (binary) or component product (bipolar).
pub fn bind(a: &Hypervector, b: &Hypervector) -> Result<Hypervector, HdcError> {
    check_compatible(a, b)?;
    let components = match a.encoding {
        Encoding::Binary => &a.components ^ &b.components,
        Encoding::Bipolar => &a.components * &b.components,
    };
    Ok(Hypervector {
        components,
        encoding: a.encoding,
    })
}

/// Majority/consensus superposition.
///
/// Binary: a component is 1 iff strictly more than half the inputs have a 1
/// there (ties go to 0). Bipolar: sign of the component sum, with exact zero
/// sums resolved by an unbiased draw from `rng`. An empty input bundles to
/// the space's zero vector.
pub fn bundle<R: Rng + ?Sized>(
    vectors: &[&Hypervector],
    space: VectorSpace,
    rng: &mut R,
) -> Result<Hypervector, HdcError> {
    if vectors.is_empty() {
        return Ok(space.zeros());
    }
    for v in vectors {
        space.check(v)?;
    }

    let mut sums = Array1::<i32>::zeros(space.dimensionality);
    for v in vectors {
        Zip::from(&mut sums)
            .and(&v.components)
            .for_each(|s, &c| *s += i32::from(c));
    }

    let n = vectors.len() as i32;
    let components = match space.encoding {
        Encoding::Binary => sums.mapv(|s| i8::from(2 * s > n)),
        Encoding::Bipolar => sums.mapv(|s| match s.signum() {
            0 => Encoding::Bipolar.draw(&mut *rng),
            sign => sign as i8,
        }),
    };

    Ok(Hypervector {
        components,
        encoding: space.encoding,
    })
}

/// Cosine similarity in `[-1, 1]`.
///
/// Two zero vectors are maximally similar (1.0); exactly one zero vector
/// gives 0.0. Lengths may differ only when one side is the zero vector.
pub fn similarity(a: &Hypervector, b: &Hypervector) -> Result<f64, HdcError> {
    let (a_zero, b_zero) = (a.is_zero(), b.is_zero());
    if a.len() != b.len() {
        if a_zero || b_zero {
            return Ok(0.0);
        }
        return Err(HdcError::dimension_mismatch(a.len(), b.len()));
    }
    if a_zero && b_zero {
        return Ok(1.0);
    }
    if a_zero || b_zero {
        return Ok(0.0);
    }
    check_compatible(a, b)?;

    let af = a.components.mapv(f64::from);
    let bf = b.components.mapv(f64::from);
    let norm = af.dot(&af).sqrt() * bf.dot(&bf).sqrt();
    if norm == 0.0 {
        return Ok(0.0);
    }
    Ok((af.dot(&bf) / norm).clamp(-1.0, 1.0))
}

/// Fraction of agreeing components: 1 - hamming(a, b) / D.
pub fn hamming_similarity(a: &Hypervector, b: &Hypervector) -> Result<f64, HdcError> {
    check_compatible(a, b)?;
    if a.is_empty() {
        return Ok(1.0);
    }
    let differing = Zip::from(&a.components)
        .and(&b.components)
        .fold(0usize, |acc, &x, &y| acc + usize::from(x != y));
    Ok(1.0 - differing as f64 / a.len() as f64)
}

/// Cyclic rotation by `n` positions (by `-n` when `inverse`).
/// Component `i` moves to `(i + n) mod D`.
pub fn permute(hv: &Hypervector, n: usize, inverse: bool) -> Hypervector {
    let d = hv.len();
    if d == 0 {
        return hv.clone();
    }
    let shift = if inverse { (d - n % d) % d } else { n % d };
    let mut components = Array1::zeros(d);
    for (i, &c) in hv.components.iter().enumerate() {
        components[(i + shift) % d] = c;
    }
    Hypervector {
        components,
        encoding: hv.encoding,
    }
}
