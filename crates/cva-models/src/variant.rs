/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Variant coordinates and the `assembly:chromosome:position:ref:alt` identifier format

use cva_core::{Assembly, Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static VARIANT_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(GRCh37|GRCh38):([^:]+):\s*([0-9]+)\s*:(-|[ACGTacgt]*):(-|[ACGTacgt]*)$")
    .expect("variant identifier pattern is valid")
});

static BASES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[ACGT]*$").expect("bases pattern is valid"));

/// Position of a small variant on a reference assembly
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantCoordinates {
  pub assembly: Assembly,
  pub chromosome: String,
  pub position: u64,
  pub reference: String,
  pub alternate: String,
}

impl VariantCoordinates {
  /// True when both alleles are plain nucleotide sequences
  pub fn is_small_variant(&self) -> bool {
    BASES.is_match(&self.reference) && BASES.is_match(&self.alternate)
  }
}

impl std::str::FromStr for VariantCoordinates {
  type Err = Error;

  fn from_str(variant_id: &str) -> Result<Self> {
    let caps = VARIANT_ID
      .captures(variant_id)
      .ok_or_else(|| Error::InvalidParameter(format!("Wrong variant identifier: {}", variant_id)))?;

    let position = caps[3]
      .parse()
      .map_err(|_| Error::InvalidParameter(format!("Wrong variant position: {}", variant_id)))?;

    Ok(VariantCoordinates {
      assembly: caps[1].parse()?,
      chromosome: caps[2].to_string(),
      position,
      reference: caps[4].to_string(),
      alternate: caps[5].to_string(),
    })
  }
}

impl std::fmt::Display for VariantCoordinates {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}:{}:{}:{}:{}",
      self.assembly, self.chromosome, self.position, self.reference, self.alternate
    )
  }
}

/// Request body of the lift over endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantsCoordinates {
  pub variants: Vec<VariantCoordinates>,
}
