//! Forward/inverse Number Theoretic Transform over up to three small primes
//! (spec.md §4.4).
//!
//! [`TransformContext`] holds one prime's modulus, root of unity, and
//! twiddle-table cache; [`Ntt`] picks the small-n, factor-3, or six-step
//! path by transform length and dispatches to [`radix2`]/[`factor3`]/
//! [`six_step`]. [`family32`]/[`family64`] hand out the three
//! [`TransformContext`]s a multi-prime convolution needs for each element
//! family, built once and twiddle-cache-invalidated when `builderFactory`
//! changes.

#![warn(missing_docs)]
#![deny(unused_must_use)]

pub mod error;
pub mod factor3;
pub mod field;
pub mod primes;
pub mod radix2;
pub mod six_step;
pub mod transform_context;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use apfloat_context::{BuilderFactory, Context};
use apfloat_modmath::{Modulus32, Modulus64};
use apfloat_storage::{AccessMode, StorageHandle};

pub use error::NttError;
pub use field::NttField;
pub use transform_context::TransformContext;

/// The three [`TransformContext`]s for the 32-bit element family, built
/// once and shared process-wide (twiddle tables are read-only after
/// construction and safe to share per spec.md §5).
pub fn family_32() -> &'static [Arc<TransformContext<Modulus32>>; 3] {
    static CELL: OnceLock<[Arc<TransformContext<Modulus32>>; 3]> = OnceLock::new();
    CELL.get_or_init(|| {
        primes::PRIME_INFO_32.map(|info| {
            Arc::new(TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root))
        })
    })
}

/// See [`family_32`], for the 64-bit element family.
pub fn family_64() -> &'static [Arc<TransformContext<Modulus64>>; 3] {
    static CELL: OnceLock<[Arc<TransformContext<Modulus64>>; 3]> = OnceLock::new();
    CELL.get_or_init(|| {
        primes::PRIME_INFO_64.map(|info| {
            Arc::new(TransformContext::new(info.modulus, info.root, info.max_log_len, info.cube_root))
        })
    })
}

/// Drop every cached twiddle table for both element families. Call this
/// when [`apfloat_context::Context::builder_factory`] changes process-wide
/// (spec.md §4.1 "switching invalidates cached transform tables").
pub fn invalidate_twiddle_caches() {
    for ctx in family_32() {
        ctx.clear_cache();
    }
    for ctx in family_64() {
        ctx.clear_cache();
    }
}

fn factory_tag(factory: BuilderFactory) -> u8 {
    match factory {
        BuilderFactory::Int => 0,
        BuilderFactory::Long => 1,
        BuilderFactory::Float => 2,
        BuilderFactory::Double => 3,
    }
}

/// Dispatches a single prime's forward/inverse transform to the small-n,
/// factor-3, or six-step path by length, honoring `ctx.number_of_processors`
/// for row-parallel dispatch in the six-step path.
pub struct Ntt<F: NttField> {
    transform_ctx: Arc<TransformContext<F>>,
    last_factory_tag: AtomicU8,
}

impl<F: NttField> Ntt<F> {
    /// Build a dispatcher over `transform_ctx`, tagged with the
    /// [`BuilderFactory`] it corresponds to (so a later `builderFactory`
    /// switch away and back is detected and clears stale twiddle tables).
    pub fn new(transform_ctx: Arc<TransformContext<F>>, factory: BuilderFactory) -> Self {
        Ntt {
            transform_ctx,
            last_factory_tag: AtomicU8::new(factory_tag(factory)),
        }
    }

    /// Run the forward transform over `storage` in place, sized against
    /// `app_ctx`'s cache and parallelism knobs.
    pub fn forward(&self, app_ctx: &Context, storage: &StorageHandle<F::Elem>) -> Result<(), NttError> {
        self.run(app_ctx, storage, false)
    }

    /// Run the inverse transform over `storage` in place.
    pub fn inverse(&self, app_ctx: &Context, storage: &StorageHandle<F::Elem>) -> Result<(), NttError> {
        self.run(app_ctx, storage, true)
    }

    fn maybe_invalidate(&self, app_ctx: &Context) {
        let current = factory_tag(app_ctx.builder_factory());
        let previous = self.last_factory_tag.swap(current, Ordering::AcqRel);
        if previous != current {
            tracing::debug!("builderFactory changed; clearing twiddle cache");
            self.transform_ctx.clear_cache();
        }
    }

    fn run(&self, app_ctx: &Context, storage: &StorageHandle<F::Elem>, inverse: bool) -> Result<(), NttError> {
        self.maybe_invalidate(app_ctx);
        let n = storage.len();
        if n <= 1 {
            return Ok(());
        }

        let element_size = std::mem::size_of::<F::Elem>();
        let small_n_threshold = ((app_ctx.cache_l2_size() as usize) / element_size).max(64);
        let parallel = app_ctx.number_of_processors() > 1;

        if n.is_power_of_two() {
            if n <= small_n_threshold {
                let mut window = storage.get_array(AccessMode::ReadWrite, 0, n)?;
                radix2::transform(&self.transform_ctx, window.as_mut_slice(), inverse);
                return Ok(());
            }
            let log_n = n.trailing_zeros();
            let log_n1 = log_n / 2;
            let n1 = 1usize << log_n1;
            let n2 = n / n1;
            let block = ((app_ctx.cache_burst() as usize) / element_size).max(1);
            tracing::debug!(n, n1, n2, parallel, "dispatching six-step NTT");
            return six_step::transform(&self.transform_ctx, storage, n1, n2, inverse, block, parallel);
        }

        if n % 3 == 0 && (n / 3).is_power_of_two() && self.transform_ctx.cube_root().is_some() {
            if n > small_n_threshold {
                return Err(NttError::InvalidLength {
                    length: n,
                    max: small_n_threshold,
                });
            }
            let mut window = storage.get_array(AccessMode::ReadWrite, 0, n)?;
            factor3::transform(&self.transform_ctx, window.as_mut_slice(), inverse);
            return Ok(());
        }

        Err(NttError::InvalidLength {
            length: n,
            max: 1usize << self.transform_ctx.max_log_len(),
        })
    }
}

/// A bundle of three [`Ntt`] dispatchers, one per fixed prime, for the
/// 32-bit element family.
pub struct ThreePrimeNtt32 {
    ntts: [Ntt<Modulus32>; 3],
}

impl ThreePrimeNtt32 {
    /// Build the bundle from the process-wide [`family_32`] contexts.
    pub fn new(factory: BuilderFactory) -> Self {
        let contexts = family_32();
        ThreePrimeNtt32 {
            ntts: std::array::from_fn(|i| Ntt::new(Arc::clone(&contexts[i]), factory)),
        }
    }

    /// Access the dispatcher for the `i`th prime (`i < 3`).
    pub fn prime(&self, i: usize) -> &Ntt<Modulus32> {
        &self.ntts[i]
    }
}

/// See [`ThreePrimeNtt32`], for the 64-bit element family.
pub struct ThreePrimeNtt64 {
    ntts: [Ntt<Modulus64>; 3],
}

impl ThreePrimeNtt64 {
    /// Build the bundle from the process-wide [`family_64`] contexts.
    pub fn new(factory: BuilderFactory) -> Self {
        let contexts = family_64();
        ThreePrimeNtt64 {
            ntts: std::array::from_fn(|i| Ntt::new(Arc::clone(&contexts[i]), factory)),
        }
    }

    /// Access the dispatcher for the `i`th prime (`i < 3`).
    pub fn prime(&self, i: usize) -> &Ntt<Modulus64> {
        &self.ntts[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apfloat_storage::memory::MemoryStorage;

    #[test]
    fn small_power_of_two_round_trips() {
        let factory = BuilderFactory::Int;
        let ctx = Context::builder().with_builder_factory(factory).build();
        let ntt = Ntt::new(Arc::clone(&family_32()[0]), factory);
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(64));
        let original: Vec<u32> = (0..64).collect();
        {
            let mut w = storage.get_array(AccessMode::Write, 0, 64).unwrap();
            w.as_mut_slice().copy_from_slice(&original);
        }
        ntt.forward(&ctx, &storage).unwrap();
        ntt.inverse(&ctx, &storage).unwrap();
        let out = storage.get_array(AccessMode::Read, 0, 64).unwrap();
        assert_eq!(out.as_slice(), original.as_slice());
    }

    #[test]
    fn large_power_of_two_goes_through_six_step() {
        let factory = BuilderFactory::Int;
        let ctx = Context::builder()
            .with_builder_factory(factory)
            .with_cache_l2_size(512)
            .build();
        let ntt = Ntt::new(Arc::clone(&family_32()[0]), factory);
        let n = 1usize << 12;
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(n));
        let original: Vec<u32> = (0..n as u32).collect();
        {
            let mut w = storage.get_array(AccessMode::Write, 0, n).unwrap();
            w.as_mut_slice().copy_from_slice(&original);
        }
        ntt.forward(&ctx, &storage).unwrap();
        ntt.inverse(&ctx, &storage).unwrap();
        let out = storage.get_array(AccessMode::Read, 0, n).unwrap();
        assert_eq!(out.as_slice(), original.as_slice());
    }

    #[test]
    fn non_admissible_length_rejected() {
        let factory = BuilderFactory::Int;
        let ctx = Context::builder().with_builder_factory(factory).build();
        let ntt = Ntt::new(Arc::clone(&family_32()[0]), factory);
        let storage: StorageHandle<u32> = Arc::new(MemoryStorage::<u32>::new(10));
        assert!(matches!(ntt.forward(&ctx, &storage), Err(NttError::InvalidLength { .. })));
    }
}
