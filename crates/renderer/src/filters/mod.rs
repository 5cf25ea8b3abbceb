//! Post-processing filters applied to the stitched image.
//!
//! Filters are looked up by name in an immutable [`FilterRegistry`] that is
//! built once and shared. A request's filter list is first planned into a
//! [`FilterChain`], which checks every name, argument count and argument
//! value, so a bad list fails before any pixels are touched.

mod annotate;
mod pad;
mod scale;
mod trim;

pub use annotate::TimestampFilter;
pub use pad::{AddPxTopFilter, Add22PxFilter};
pub use scale::ScaleFilter;
pub use trim::TrimFilter;

use std::collections::HashMap;
use std::sync::Arc;

use stitch_common::{FilterContext, FilterInvocation, StitchError, StitchResult};

use crate::Raster;

/// One named image transformation.
pub trait Filter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Accepted argument counts.
    fn arity(&self) -> &'static [usize];

    /// Validate argument values. Called after the count has been checked.
    fn check_args(&self, _args: &[String]) -> StitchResult<()> {
        Ok(())
    }

    /// Validate against the request's target size `(width, height)`.
    fn check_target(&self, _args: &[String], _target: (u32, u32)) -> StitchResult<()> {
        Ok(())
    }

    fn apply(&self, raster: Raster, ctx: &FilterContext, args: &[String]) -> StitchResult<Raster>;
}

/// Name → filter lookup.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<&'static str, Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in filter.
    pub fn builtin() -> Self {
        Self::new()
            .with(ScaleFilter)
            .with(TrimFilter)
            .with(AddPxTopFilter)
            .with(Add22PxFilter)
            .with(TimestampFilter)
    }

    /// Add (or replace) a filter under its own name.
    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.insert(filter.name(), Arc::new(filter));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.filters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolve and validate a filter list.
    pub fn plan(&self, specs: &[FilterInvocation]) -> StitchResult<FilterChain> {
        let steps = specs
            .iter()
            .map(|spec| {
                let filter = self
                    .get(&spec.name)
                    .ok_or_else(|| StitchError::UnknownFilter(spec.name.clone()))?;

                let arity = filter.arity();
                if !arity.contains(&spec.args.len()) {
                    return Err(StitchError::FilterArityMismatch {
                        filter: spec.name.clone(),
                        expected: describe_arity(arity),
                        actual: spec.args.len(),
                    });
                }
                filter.check_args(&spec.args)?;

                Ok((filter.clone(), spec.args.clone()))
            })
            .collect::<StitchResult<Vec<_>>>()?;

        Ok(FilterChain { steps })
    }

    /// [`plan`](Self::plan), plus the checks that depend on the target size.
    pub fn plan_for_target(
        &self,
        specs: &[FilterInvocation],
        target: (u32, u32),
    ) -> StitchResult<FilterChain> {
        let chain = self.plan(specs)?;
        for (filter, args) in &chain.steps {
            filter.check_target(args, target)?;
        }
        Ok(chain)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

/// A validated, ordered list of filter applications.
#[derive(Clone, Default)]
pub struct FilterChain {
    steps: Vec<(Arc<dyn Filter>, Vec<String>)>,
}

impl FilterChain {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fold the raster through every step, left to right.
    pub fn apply_all(&self, raster: Raster, ctx: &FilterContext) -> StitchResult<Raster> {
        self.steps.iter().try_fold(raster, |img, (filter, args)| {
            tracing::debug!(
                filter = filter.name(),
                args = ?args,
                width = img.width(),
                height = img.height(),
                "Applying filter"
            );
            filter.apply(img, ctx, args)
        })
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|(filter, args)| (filter.name(), args)))
            .finish()
    }
}

/// Plan and apply `specs` in one go.
pub fn apply_all(
    raster: Raster,
    specs: &[FilterInvocation],
    registry: &FilterRegistry,
    ctx: &FilterContext,
) -> StitchResult<Raster> {
    registry.plan(specs)?.apply_all(raster, ctx)
}

fn describe_arity(arity: &[usize]) -> String {
    match arity {
        [] => "no".to_string(),
        [n] => n.to_string(),
        [rest @ .., last] => format!(
            "{} or {}",
            rest.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            last
        ),
    }
}

/// Parse a pixel count argument.
pub(crate) fn parse_pixels(filter: &str, arg: &str) -> StitchResult<u32> {
    arg.parse::<u32>()
        .map_err(|_| StitchError::InvalidFilterArgument {
            filter: filter.to_string(),
            message: format!("'{}' is not a non-negative integer", arg),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn ctx() -> FilterContext {
        FilterContext {
            satellite: "goes-16".into(),
            sector: "full_disk".into(),
            product: "geocolor".into(),
            timestamp: 20240115123020,
            target_width: 64,
            target_height: 32,
        }
    }

    struct Invert;

    impl Filter for Invert {
        fn name(&self) -> &'static str {
            "invert"
        }
        fn arity(&self) -> &'static [usize] {
            &[0]
        }
        fn apply(&self, mut raster: Raster, _: &FilterContext, _: &[String]) -> StitchResult<Raster> {
            image::imageops::invert(&mut raster);
            Ok(raster)
        }
    }

    #[test]
    fn test_builtin_names() {
        assert_eq!(
            FilterRegistry::builtin().names(),
            vec!["add_22_px", "add_px_top", "scale", "timestamp", "trim"]
        );
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let img = Raster::from_pixel(3, 3, Rgb([9, 8, 7]));
        let chain = FilterRegistry::builtin().plan(&[]).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.apply_all(img.clone(), &ctx()).unwrap(), img);
    }

    #[test]
    fn test_custom_filter_registration() {
        let registry = FilterRegistry::new().with(Invert);
        let out = apply_all(
            Raster::from_pixel(2, 2, Rgb([0, 0, 0])),
            &[FilterInvocation::new("invert", vec![])],
            &registry,
            &ctx(),
        )
        .unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let registry = FilterRegistry::builtin();
        let specs = [
            FilterInvocation::new("add_px_top", vec!["2".into()]),
            FilterInvocation::new("add_px_top", vec!["3".into()]),
        ];
        let chain = registry.plan(&specs).unwrap();
        assert_eq!(chain.len(), 2);
        let out = chain.apply_all(Raster::new(4, 4), &ctx()).unwrap();
        assert_eq!(out.dimensions(), (4, 9));
    }

    #[test]
    fn test_plan_for_target_checks_scale_size() {
        let registry = FilterRegistry::builtin();
        let bare = [FilterInvocation::new("scale", vec![])];

        assert!(registry.plan_for_target(&bare, (64, 32)).is_ok());
        for target in [(0, 32), (64, 0)] {
            assert!(matches!(
                registry.plan_for_target(&bare, target),
                Err(StitchError::InvalidFilterArgument { .. })
            ));
        }

        // Explicit arguments do not depend on the request size
        let sized = [FilterInvocation::new("scale", vec!["10".into(), "10".into()])];
        assert!(registry.plan_for_target(&sized, (0, 0)).is_ok());
    }

    #[test]
    fn test_describe_arity() {
        assert_eq!(describe_arity(&[1]), "1");
        assert_eq!(describe_arity(&[0, 2]), "0 or 2");
        assert_eq!(describe_arity(&[0, 1, 2]), "0, 1 or 2");
    }

    #[test]
    fn test_parse_pixels() {
        assert_eq!(parse_pixels("scale", "1920").unwrap(), 1920);
        assert!(matches!(
            parse_pixels("scale", "-4"),
            Err(StitchError::InvalidFilterArgument { .. })
        ));
        assert!(parse_pixels("scale", "wide").is_err());
    }
}
