//! SMART-style term weighting components.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFrequency {
    /// `1 + log10(tf)`, 0 when the term is absent.
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFrequency {
    /// Constant 1.
    None,
    /// `log10(N / df)`, 0 when `df` is 0.
    Idf,
}

impl TermFrequency {
    pub fn weight(self, tf: u32) -> f64 {
        match self {
            TermFrequency::Logarithmic => log_tf(tf),
        }
    }
}

impl DocumentFrequency {
    pub fn weight(self, num_docs: usize, df: usize) -> f64 {
        match self {
            DocumentFrequency::None => 1.0,
            DocumentFrequency::Idf => idf(num_docs, df),
        }
    }
}

pub fn log_tf(tf: u32) -> f64 {
    if tf >= 1 { 1.0 + (tf as f64).log10() } else { 0.0 }
}

pub fn idf(num_docs: usize, df: usize) -> f64 {
    debug_assert!(df <= num_docs, "df {df} exceeds collection size {num_docs}");
    if df == 0 { 0.0 } else { (num_docs as f64 / df as f64).log10() }
}

/// A tf component paired with a df component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TfIdf {
    pub tf: TermFrequency,
    pub df: DocumentFrequency,
}

impl TfIdf {
    /// `ltc` side of lnc.ltc: log tf times idf.
    pub const QUERY: TfIdf = TfIdf { tf: TermFrequency::Logarithmic, df: DocumentFrequency::Idf };
    /// `lnc` side: log tf, no idf.
    pub const DOCUMENT: TfIdf =
        TfIdf { tf: TermFrequency::Logarithmic, df: DocumentFrequency::None };

    pub fn weight(self, tf: u32, num_docs: usize, df: usize) -> f64 {
        self.tf.weight(tf) * self.df.weight(num_docs, df)
    }
}

/// Euclidean norm of a weight vector.
pub fn vector_length<I: IntoIterator<Item = f64>>(weights: I) -> f64 {
    weights.into_iter().map(|w| w * w).sum::<f64>().sqrt()
}
