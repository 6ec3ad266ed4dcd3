/*!
 * Delimiter round-trip protocol.
 *
 * All text runs of a document travel to the model inside a single request,
 * joined by a delimiter token. The response is split on the same token and the
 * resulting blocks are matched back to their formatting slots purely by
 * position: index is identity. Nothing here attempts to repair a response;
 * a block-count mismatch is reported as `Reconciliation::Mismatched` and the
 * naive split is kept.
 */

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

/// Delimiter used when none is configured
pub const DEFAULT_DELIMITER: &str = " &#&#&#& ";

/// Filler shown for the shorter side of a block comparison
pub const PLACEHOLDER: &str = "---";

/// Sentinel separating text blocks in a packed request.
///
/// The stored form is the token padded with one space on each side, which
/// survives the whitespace normalization models tend to apply around words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter {
    padded: String,
}

impl Delimiter {
    /// Build a delimiter from a token, adding the surrounding spaces.
    ///
    /// Returns `None` when the token is empty or contains whitespace; the
    /// padding spaces must be the only whitespace in the padded form.
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self {
            padded: format!(" {} ", token),
        })
    }

    /// The padded delimiter, exactly as inserted between blocks
    pub fn as_str(&self) -> &str {
        &self.padded
    }

    /// The bare token without padding
    pub fn token(&self) -> &str {
        self.padded.trim()
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self {
            padded: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.padded)
    }
}

impl TryFrom<String> for Delimiter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| "delimiter token must be non-empty and contain no whitespace".to_string())
    }
}

impl From<Delimiter> for String {
    fn from(delimiter: Delimiter) -> Self {
        delimiter.padded
    }
}

/// Join run texts into one request body.
///
/// The result holds exactly `texts.len() - 1` delimiters provided no text
/// contains the delimiter itself (see [`find_collisions`]).
pub fn pack<S: AsRef<str>>(texts: &[S], delimiter: &Delimiter) -> String {
    let mut packed = String::with_capacity(
        texts.iter().map(|t| t.as_ref().len()).sum::<usize>()
            + texts.len().saturating_sub(1) * delimiter.as_str().len(),
    );
    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            packed.push_str(delimiter.as_str());
        }
        packed.push_str(text.as_ref());
    }
    packed
}

/// Split a response on the delimiter. Always yields at least one block.
pub fn split(raw: &str, delimiter: &Delimiter) -> Vec<String> {
    raw.split(delimiter.as_str()).map(str::to_string).collect()
}

/// Indices of texts that already contain the bare delimiter token.
///
/// Any hit would shift every following block, so callers reject the input.
pub fn find_collisions<S: AsRef<str>>(texts: &[S], delimiter: &Delimiter) -> Vec<usize> {
    let token = delimiter.token();
    texts
        .iter()
        .enumerate()
        .filter(|(_, text)| text.as_ref().contains(token))
        .map(|(i, _)| i)
        .collect()
}

/// Whether `packed` splits back into exactly `texts`.
///
/// A run ending or starting with part of the delimiter can shift a split
/// point across the join even when no single run contains the token.
pub fn packs_cleanly<S: AsRef<str>>(texts: &[S], packed: &str, delimiter: &Delimiter) -> bool {
    if texts.is_empty() {
        return packed.is_empty();
    }
    let blocks = split(packed, delimiter);
    blocks.len() == texts.len() && blocks.iter().zip(texts).all(|(block, text)| block == text.as_ref())
}

/// Index of the first run whose join with the next one does not split back.
///
/// `None` when `packed` round-trips to `texts`.
pub fn find_join_collision<S: AsRef<str>>(texts: &[S], packed: &str, delimiter: &Delimiter) -> Option<usize> {
    if packs_cleanly(texts, packed, delimiter) {
        return None;
    }
    let first_bad_prefix =
        (1..texts.len()).find(|&last| !packs_cleanly(&texts[..=last], &pack(&texts[..=last], delimiter), delimiter));
    Some(first_bad_prefix.map_or(0, |last| last - 1))
}

/// Outcome of splitting a model response against the expected slot count
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Block count matches the number of input runs
    Exact(Vec<String>),
    /// Block count differs; blocks are the uncorrected split
    Mismatched {
        /// Blocks from the naive split
        blocks: Vec<String>,
        /// Number of runs that were sent
        expected: usize,
    },
}

impl Reconciliation {
    /// Blocks in response order
    pub fn blocks(&self) -> &[String] {
        match self {
            Self::Exact(blocks) | Self::Mismatched { blocks, .. } => blocks,
        }
    }

    /// Consume into the blocks
    pub fn into_blocks(self) -> Vec<String> {
        match self {
            Self::Exact(blocks) | Self::Mismatched { blocks, .. } => blocks,
        }
    }

    /// Consume into `(blocks, mismatch)`
    pub fn into_parts(self) -> (Vec<String>, bool) {
        let mismatch = self.is_mismatch();
        (self.into_blocks(), mismatch)
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatched { .. })
    }

    /// Number of blocks the response was split into
    pub fn actual(&self) -> usize {
        self.blocks().len()
    }

    /// Number of blocks that were expected
    pub fn expected(&self) -> usize {
        match self {
            Self::Exact(blocks) => blocks.len(),
            Self::Mismatched { expected, .. } => *expected,
        }
    }
}

/// Split `raw` and compare the block count with `expected`.
pub fn reconcile(raw: &str, expected: usize, delimiter: &Delimiter) -> Reconciliation {
    let blocks = split(raw, delimiter);
    debug!("Reconciling response: expected={}, found={}", expected, blocks.len());

    if blocks.len() == expected {
        Reconciliation::Exact(blocks)
    } else {
        Reconciliation::Mismatched { blocks, expected }
    }
}

/// One index-aligned line of the input/output comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub index: usize,
    pub input: String,
    pub output: String,
}

/// Align input and output blocks by index, padding the shorter side with [`PLACEHOLDER`].
pub fn compare_blocks<A: AsRef<str>, B: AsRef<str>>(inputs: &[A], outputs: &[B]) -> Vec<ComparisonRow> {
    let rows = inputs.len().max(outputs.len());
    (0..rows)
        .map(|index| ComparisonRow {
            index,
            input: inputs.get(index).map_or(PLACEHOLDER, |s| s.as_ref()).to_string(),
            output: outputs.get(index).map_or(PLACEHOLDER, |s| s.as_ref()).to_string(),
        })
        .collect()
}

/// Render comparison rows for the operator console
pub fn render_comparison(rows: &[ComparisonRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(" >> Input: {}\n", row.input));
        out.push_str(&format!(" >> Output: {}\n\n", row.output));
    }
    out
}
