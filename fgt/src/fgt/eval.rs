//! Evaluation of the fast Gauss transform
use log::{debug, info, warn};
use ndarray::Array1;

use crate::{
    fgt::{
        constants::LARGE_EXPANSION_WARN_THRESHOLD,
        helpers::optionally_time,
        kernel::GaussianKernel,
        multi_index::MultiIndexTable,
        types::{GaussTransform, InteractionCounts, InteractionParameters, MultipoleExpansion},
    },
    grid::types::{Grid, GridGeometry},
    traits::{
        fgt::{Evaluate, SourceToTargetTranslation, SourceTranslation, TargetTranslation},
        general::FgtScalar,
        kernel::Kernel,
        types::{FgtError, OperatorTime, OperatorType},
    },
};

impl<T> GaussTransform<T>
where
    T: FgtScalar,
{
    /// Run `f` as stage `operator`, recording its duration if the transform is timed.
    fn run_stage<F>(&mut self, operator: OperatorType, f: F) -> Result<(), FgtError>
    where
        F: FnOnce(&mut Self) -> Result<(), FgtError>,
    {
        let timed = self.timed;
        let (result, duration) = optionally_time(timed, || f(self));

        result?;

        if let Some(d) = duration {
            self.operator_times
                .push(OperatorTime::from_duration(operator, d));
        }

        Ok(())
    }
}

impl<T> Evaluate for GaussTransform<T>
where
    T: FgtScalar,
{
    type Scalar = T;
    type Kernel = GaussianKernel<T>;

    fn evaluate_grid(&mut self) -> Result<(), FgtError> {
        let mut geometry = None;
        self.run_stage(OperatorType::Grid, |fgt| {
            geometry = Some(GridGeometry::new(
                fgt.references.view(),
                fgt.kernel.bandwidth(),
                fgt.tolerance,
            )?);
            Ok(())
        })?;

        let Some(geometry) = geometry else {
            return Err(FgtError::Failed("Grid geometry was not computed".to_string()));
        };

        let order = geometry.truncation_order;
        let parameters = InteractionParameters::new(
            self.tolerance,
            order,
            self.dim,
            self.far_field_threshold,
            self.local_threshold,
        )?;

        debug!(
            "Grid: {:?} boxes per axis ({} total), radius ratio {:?}, truncation order {}",
            geometry.n_boxes_axis, geometry.n_boxes, geometry.radius_ratio, order
        );
        debug!(
            "Interaction radius {:?} ({} boxes), nfmax {}, nlmax {}",
            geometry.interaction_radius, parameters.kdis, parameters.nfmax, parameters.nlmax
        );

        let mut grid = None;
        self.run_stage(OperatorType::Assign, |fgt| {
            grid = Some(Grid::new(
                geometry,
                fgt.queries.view(),
                fgt.references.view(),
            )?);
            Ok(())
        })?;

        let Some(grid) = grid else {
            return Err(FgtError::Failed("Points were not assigned to the grid".to_string()));
        };

        // Expansions are only formed for boxes above the thresholds, so p^d is bounded by p
        // times the number of points whenever the table is needed
        let needs_expansions = grid.boxes.iter().any(|b| {
            b.references.len() > parameters.nfmax || b.queries.len() > parameters.nlmax
        });

        self.multi_indices = if needs_expansions {
            let table = MultiIndexTable::new(order, self.dim)?;
            if table.n_coeffs > LARGE_EXPANSION_WARN_THRESHOLD {
                warn!(
                    "Expansions hold {} coefficients per box, consider a larger bandwidth or a looser tolerance",
                    table.n_coeffs
                );
            }
            Some(table)
        } else {
            None
        };

        debug!(
            "{} occupied reference boxes, {} occupied query boxes",
            grid.n_occupied_reference_boxes(),
            grid.n_occupied_query_boxes()
        );

        let n_boxes = grid.geometry.n_boxes;
        self.multipoles = vec![MultipoleExpansion::Uncomputed; n_boxes];
        self.locals = vec![Vec::new(); n_boxes];
        self.potentials = vec![T::zero(); self.queries.ncols()];
        self.densities = None;
        self.interaction_counts = InteractionCounts::default();
        self.parameters = Some(parameters);
        self.grid = Some(grid);

        Ok(())
    }

    fn evaluate_sources(&mut self) -> Result<(), FgtError> {
        self.run_stage(OperatorType::P2M, |fgt| fgt.p2m())
    }

    fn evaluate_interactions(&mut self) -> Result<(), FgtError> {
        self.run_stage(OperatorType::Interactions, |fgt| fgt.interactions())
    }

    fn evaluate_targets(&mut self) -> Result<(), FgtError> {
        self.run_stage(OperatorType::L2P, |fgt| fgt.l2p())?;
        self.run_stage(OperatorType::Normalise, |fgt| fgt.normalise())
    }

    fn evaluate(&mut self) -> Result<(), FgtError> {
        info!(
            "Computing FGT density estimate for {} queries, {} references in {} dimensions",
            self.queries.ncols(),
            self.references.ncols(),
            self.dim
        );

        self.operator_times.clear();

        self.evaluate_grid()?;
        self.evaluate_sources()?;
        self.evaluate_interactions()?;
        self.evaluate_targets()?;

        let counts = &self.interaction_counts;
        debug!(
            "Box pairs: {} P2P, {} P2L, {} M2P, {} M2L; {} P2M, {} L2P",
            counts.direct,
            counts.direct_local,
            counts.far_field,
            counts.translation,
            counts.p2m,
            counts.l2p
        );

        let total: u64 = self.operator_times.iter().map(|t| t.time).sum();
        if self.timed {
            info!("FGT density estimate completed in {total} us");
        } else {
            info!("FGT density estimate completed");
        }

        Ok(())
    }

    fn densities(&self) -> Result<&Array1<T>, FgtError> {
        self.densities.as_ref().ok_or(FgtError::NotComputed)
    }

    fn kernel(&self) -> &Self::Kernel {
        &self.kernel
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn grid(&self) -> Option<&Grid<T>> {
        self.grid.as_ref()
    }

    fn truncation_order(&self) -> Option<usize> {
        self.grid.as_ref().map(|g| g.geometry.truncation_order)
    }

    fn n_coeffs(&self) -> Option<usize> {
        let order = self.truncation_order()?;
        order.checked_pow(u32::try_from(self.dim).ok()?)
    }

    fn operator_times(&self) -> &[OperatorTime] {
        &self.operator_times
    }

    fn interaction_counts(&self) -> &InteractionCounts {
        &self.interaction_counts
    }
}
