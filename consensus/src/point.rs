// Modern, minimalistic & standard-compliant cold wallet library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2020-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2020-2024 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2020-2024 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::OnceLock;

use crate::{FieldElem, Scalar, SECP256K1};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PointError {
    /// coordinates do not satisfy the secp256k1 curve equation.
    NotOnCurve,

    /// point at infinity has no affine representation.
    Infinity,
}

/// Point on secp256k1 in affine coordinates. Constructors guarantee that the
/// coordinates satisfy `y² = x³ + 7 (mod p)`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct AffinePoint {
    x: FieldElem,
    y: FieldElem,
}

/// Element of the secp256k1 group: either an affine point or the identity.
#[derive(Clone, PartialEq, Eq, Hash, Debug, From)]
pub enum Point {
    /// Point at infinity, the group identity.
    Infinity,

    #[from]
    Affine(AffinePoint),
}

impl AffinePoint {
    pub fn new(x: FieldElem, y: FieldElem) -> Result<Self, PointError> {
        let point = AffinePoint { x, y };
        if !point.is_on_curve() {
            return Err(PointError::NotOnCurve);
        }
        Ok(point)
    }

    /// Base point `G`.
    pub fn generator() -> &'static AffinePoint {
        static G: OnceLock<AffinePoint> = OnceLock::new();
        G.get_or_init(|| {
            let x = FieldElem::from_be_bytes(SECP256K1.gx).expect("generator x is canonical");
            let y = FieldElem::from_be_bytes(SECP256K1.gy).expect("generator y is canonical");
            AffinePoint::new(x, y).expect("generator lies on the curve")
        })
    }

    #[inline]
    pub fn x(&self) -> &FieldElem { &self.x }

    #[inline]
    pub fn y(&self) -> &FieldElem { &self.y }

    /// Right-hand side of the curve equation, `x³ + 7`.
    pub(crate) fn curve_rhs(x: &FieldElem) -> FieldElem {
        let b = FieldElem::from_be_bytes(SECP256K1.b).expect("curve coefficient is canonical");
        &(&x.square() * x) + &b
    }

    pub fn is_on_curve(&self) -> bool { self.y.square() == Self::curve_rhs(&self.x) }

    pub fn negate(&self) -> AffinePoint {
        AffinePoint {
            x: self.x.clone(),
            y: -&self.y,
        }
    }
}

impl Point {
    pub fn generator() -> Point { Point::Affine(AffinePoint::generator().clone()) }

    /// Computes `k·G`.
    pub fn mul_base(k: &Scalar) -> Point { Point::generator().mul(k) }

    pub fn is_infinity(&self) -> bool { matches!(self, Point::Infinity) }

    pub fn into_affine(self) -> Result<AffinePoint, PointError> {
        match self {
            Point::Infinity => Err(PointError::Infinity),
            Point::Affine(point) => Ok(point),
        }
    }

    pub fn negate(&self) -> Point {
        match self {
            Point::Infinity => Point::Infinity,
            Point::Affine(point) => Point::Affine(point.negate()),
        }
    }

    /// Group addition using affine formulas. Falls back to doubling for equal
    /// points and yields [`Point::Infinity`] for `P + (-P)`.
    pub fn add(&self, other: &Point) -> Point {
        let (p, q) = match (self, other) {
            (Point::Infinity, _) => return other.clone(),
            (_, Point::Infinity) => return self.clone(),
            (Point::Affine(p), Point::Affine(q)) => (p, q),
        };

        if p.x == q.x {
            // equal x leaves only two options: the same point or its negation
            if p.y == q.y {
                return self.double();
            }
            return Point::Infinity;
        }

        let lambda = ratio(&(&q.y - &p.y), &(&q.x - &p.x));
        let x = &(&lambda.square() - &p.x) - &q.x;
        let y = &(&lambda * &(&p.x - &x)) - &p.y;
        Point::Affine(AffinePoint { x, y })
    }

    /// Point doubling for `a = 0` curves; a point with `y = 0` has order two and
    /// doubles into infinity.
    pub fn double(&self) -> Point {
        let p = match self {
            Point::Infinity => return Point::Infinity,
            Point::Affine(p) => p,
        };
        if p.y.is_zero() {
            return Point::Infinity;
        }

        let three_x2 = &p.x.square() * &FieldElem::from_u64(3);
        let lambda = ratio(&three_x2, &p.y.double());
        let x = &lambda.square() - &p.x.double();
        let y = &(&lambda * &(&p.x - &x)) - &p.y;
        Point::Affine(AffinePoint { x, y })
    }

    /// Scalar multiplication with a Montgomery ladder: every bit of the scalar
    /// costs exactly one addition and one doubling.
    pub fn mul(&self, k: &Scalar) -> Point {
        let mut r0 = Point::Infinity;
        let mut r1 = self.clone();
        // invariant: r1 = r0 + self
        for bit in k.bits() {
            if bit {
                r0 = r0.add(&r1);
                r1 = r1.double();
            } else {
                r1 = r0.add(&r1);
                r0 = r0.double();
            }
        }
        r0
    }
}

fn ratio(num: &FieldElem, den: &FieldElem) -> FieldElem {
    num * &den.invert().expect("denominator is non-zero for distinct x or non-zero y")
}
