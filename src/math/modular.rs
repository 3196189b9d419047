//! Modular arithmetic over arbitrary-precision integers.

use num_bigint::{BigInt, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::Rng;

use crate::digest_sha2;
use crate::error::{EngineError, EngineResult};

/// Reduces `a` into `[0, m)`. `m` must be positive.
pub fn modulo(a: &BigInt, m: &BigInt) -> BigInt {
    debug_assert!(m.is_positive(), "modulus must be positive");
    a.mod_floor(m)
}

pub(crate) fn ensure_modulus(m: &BigInt) -> EngineResult<()> {
    if m.is_positive() {
        Ok(())
    } else {
        Err(EngineError::InvalidModulus(m.clone()))
    }
}

/// Extended Euclidean algorithm.
///
/// Returns `(g, x, y)` with `a*x + b*y = g = gcd(a, b)`. When `a = 0` the
/// result is `(b, 0, 1)`. Operands are used as given; callers that need a
/// canonical residue reduce first.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_x, mut x) = (BigInt::one(), BigInt::zero());
    let (mut old_y, mut y) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let (quotient, remainder) = old_r.div_mod_floor(&r);
        old_r = std::mem::replace(&mut r, remainder);

        let next_x = &old_x - &quotient * &x;
        old_x = std::mem::replace(&mut x, next_x);

        let next_y = &old_y - &quotient * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }

    (old_r, old_x, old_y)
}

/// Modular multiplicative inverse of `a` modulo `m`, in `[0, m)`.
///
/// `a` is reduced modulo `m` before the gcd is taken, so negative and
/// oversized operands behave like their canonical residue.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> EngineResult<BigInt> {
    ensure_modulus(m)?;
    let residue = modulo(a, m);
    let (g, x, _) = extended_gcd(&residue, m);
    if !g.is_one() {
        return Err(EngineError::NoInverse {
            value: a.clone(),
            modulus: m.clone(),
        });
    }
    Ok(modulo(&x, m))
}

/// Computes `base^exp mod m` by square-and-multiply.
///
/// A negative exponent raises the inverse of `base`, so it fails with
/// `NoInverse` when `base` is not a unit modulo `m`.
pub fn mod_pow(base: &BigInt, exp: &BigInt, m: &BigInt) -> EngineResult<BigInt> {
    ensure_modulus(m)?;
    if exp.is_negative() {
        let inverse = mod_inverse(base, m)?;
        return Ok(inverse.modpow(&-exp, m));
    }
    Ok(modulo(base, m).modpow(exp, m))
}

/// SHA-256 of the UTF-8 message read as a big-endian non-negative integer.
pub fn hash_to_integer(message: &str) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &digest_sha2(message.as_bytes()))
}

/// Samples a nonce in `[1, order)` that is invertible modulo `order`.
pub fn random_nonce<R: Rng + ?Sized>(order: &BigInt, rng: &mut R) -> EngineResult<BigInt> {
    if order <= &BigInt::one() {
        return Err(EngineError::InvalidModulus(order.clone()));
    }
    loop {
        let k = rng.gen_bigint_range(&BigInt::one(), order);
        if k.gcd(order).is_one() {
            return Ok(k);
        }
    }
}
