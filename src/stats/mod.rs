//! Statistical significance machinery for carrier detection.
//!
//! Two pieces make up the detection statistic:
//!
//! - [`cosine::cosine_pvalue`]: the closed-form tail probability of the
//!   cosine similarity between a fixed unit vector and a uniformly random
//!   unit vector in d dimensions.
//! - [`combine::combine_pvalues`]: Fisher's method for aggregating the
//!   per-class p-values into a single joint significance value.
//!
//! Both rest on regularized incomplete beta/gamma evaluations in
//! [`special`], computed with log-space prefactors so that the large shape
//! parameters arising from high-dimensional feature spaces (a = (d-1)/2
//! with d in the hundreds) do not overflow.

pub mod combine;
pub mod cosine;
pub(crate) mod special;

pub use combine::combine_pvalues;
pub use cosine::cosine_pvalue;
