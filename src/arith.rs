// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Saturating fixed-point arithmetic primitives.
//!
//! All signal-path values in this codec are 24-bit fixed-point numbers kept
//! in `i32`s, with products accumulated in `i64` before the final rounded
//! shift. These helpers are the only place where saturation and rounding
//! happen, so both sides of the codec stay bit-exact as long as they agree
//! here.

/// Saturates `a` into the range of a signed `(p + 1)`-bit integer.
#[inline]
pub(crate) fn clip_intp2(a: i32, p: u32) -> i32 {
    if (a.wrapping_add(1 << p) as u32) & !((2 << p) - 1) != 0 {
        (a >> 31) ^ ((1 << p) - 1)
    } else {
        a
    }
}

/// Reinterprets the lowest `bits` bits of `val` as a signed integer.
#[inline]
pub(crate) fn sign_extend(val: i32, bits: u32) -> i32 {
    let shift = 32 - bits;
    (val << shift) >> shift
}

/// Shifts right with rounding, except that exact halves round down.
///
/// The rounding addition wraps at the integer limits, like the truncating
/// two's-complement arithmetic of the reference. `shift` must be at least 1.
#[inline]
pub(crate) fn rshift32(value: i32, shift: u32) -> i32 {
    let rounding = 1 << (shift - 1);
    let mask = (1 << (shift + 1)) - 1;
    (value.wrapping_add(rounding) >> shift) - i32::from(value & mask == rounding)
}

/// 64-bit variant of [`rshift32`].
#[inline]
pub(crate) fn rshift64(value: i64, shift: u32) -> i64 {
    let rounding = 1i64 << (shift - 1);
    let mask = (1i64 << (shift + 1)) - 1;
    (value.wrapping_add(rounding) >> shift) - i64::from(value & mask == rounding)
}

/// Rounded shift followed by saturation to the 24-bit signed range.
#[inline]
pub(crate) fn rshift32_clip24(value: i32, shift: u32) -> i32 {
    clip_intp2(rshift32(value, shift), 23)
}

/// 64-bit input variant of [`rshift32_clip24`].
///
/// The shifted value is truncated to 32 bits before saturation, matching the
/// reference arithmetic.
#[inline]
pub(crate) fn rshift64_clip24(value: i64, shift: u32) -> i32 {
    clip_intp2(rshift64(value, shift) as i32, 23)
}
