use log::debug;
use log::warn;

use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::RandomTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SearchEvent;
use crate::branching::SelectionContext;
use crate::containers::HashMap;
use crate::create_statistics_struct;
use crate::engine::Model;
use crate::engine::ValueIterator;
use crate::engine::VariableId;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Domains with a larger amplitude keep their value activities in a map.
const DENSE_AMPLITUDE_LIMIT: i64 = 512;

/// The two-sided 95% quantiles of the Student t-distribution; entry `n - 1` is used after `n`
/// probes.
const T_QUANTILES: [f64; 50] = [
    999.99, 12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179,
    2.160, 2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060,
    2.056, 2.052, 2.048, 2.045, 2.042, 2.040, 2.037, 2.035, 2.032, 2.030, 2.028, 2.026, 2.024,
    2.023, 2.021, 2.000, 1.990, 1.984, 1.980, 1.977, 1.975, 1.973, 1.972, 1.969,
];

fn t_quantile(probes: u32) -> f64 {
    match probes {
        0 => f64::INFINITY,
        1..=40 => T_QUANTILES[probes as usize - 1],
        41..=60 => T_QUANTILES[40],
        61..=80 => T_QUANTILES[41],
        81..=100 => T_QUANTILES[42],
        101..=120 => T_QUANTILES[43],
        121..=140 => T_QUANTILES[44],
        141..=160 => T_QUANTILES[45],
        161..=180 => T_QUANTILES[46],
        181..=200 => T_QUANTILES[47],
        201..=250 => T_QUANTILES[48],
        _ => 1.960,
    }
}

/// The options of [`ActivityBased`].
#[derive(Debug, Clone, Copy)]
pub struct ActivityOptions {
    /// The factor by which the activity of every free variable decays per decision.
    pub aging: f64,
    /// Sampling ends once the confidence interval of every activity is smaller than this ratio
    /// of its mean.
    pub interval_ratio: f64,
    /// How slowly the activity of a value forgets its past, see [`ActivityBased`].
    pub forget: f64,
    /// Sampling lasts for at least this many probes.
    pub min_sampling_iterations: u32,
    /// Sampling is stopped after this many probes, whether the activities converged or not.
    pub max_sampling_iterations: u32,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        ActivityOptions {
            aging: 0.999,
            interval_ratio: 0.2,
            forget: 8.0,
            min_sampling_iterations: 1,
            max_sampling_iterations: 1000,
        }
    }
}

create_statistics_struct!(ActivityStatistics {
    sampling_probes: u64,
    decisions: u64,
});

/// The activity of the values of one variable, next to its mean over the sampling probes.
#[derive(Debug, Clone)]
enum ValueActivity {
    Dense {
        offset: i32,
        activity: Vec<f64>,
        mean: Vec<f64>,
    },
    Sparse {
        activity: HashMap<i32, f64>,
        mean: HashMap<i32, f64>,
    },
}

impl ValueActivity {
    fn new(lower_bound: i32, upper_bound: i32) -> Self {
        let amplitude = upper_bound as i64 - lower_bound as i64 + 1;
        if amplitude > DENSE_AMPLITUDE_LIMIT {
            ValueActivity::Sparse {
                activity: HashMap::default(),
                mean: HashMap::default(),
            }
        } else {
            let amplitude = amplitude.max(0) as usize;
            ValueActivity::Dense {
                offset: lower_bound,
                activity: vec![0.0; amplitude],
                mean: vec![0.0; amplitude],
            }
        }
    }

    fn activity(&self, value: i32) -> f64 {
        match self {
            ValueActivity::Dense {
                offset, activity, ..
            } => usize::try_from(value as i64 - *offset as i64)
                .ok()
                .and_then(|index| activity.get(index))
                .copied()
                .unwrap_or(0.0),
            ValueActivity::Sparse { activity, .. } => {
                activity.get(&value).copied().unwrap_or(0.0)
            }
        }
    }

    fn set_activity(&mut self, value: i32, new_activity: f64) {
        match self {
            ValueActivity::Dense {
                offset, activity, ..
            } => {
                if let Some(slot) = usize::try_from(value as i64 - *offset as i64)
                    .ok()
                    .and_then(|index| activity.get_mut(index))
                {
                    *slot = new_activity;
                }
            }
            ValueActivity::Sparse { activity, .. } => {
                let _ = activity.insert(value, new_activity);
            }
        }
    }

    /// Folds the activities of the last probe into the means.
    fn update(&mut self, probes: u32) {
        let probes = probes as f64;
        match self {
            ValueActivity::Dense { activity, mean, .. } => {
                for (mean, &activity) in mean.iter_mut().zip(activity.iter()) {
                    *mean += (activity - *mean) / probes;
                }
            }
            ValueActivity::Sparse { activity, mean } => {
                for (&value, &activity) in activity.iter() {
                    let mean = mean.entry(value).or_insert(0.0);
                    *mean += (activity - *mean) / probes;
                }
            }
        }
    }

    /// Replaces the activities by their means, once sampling is over.
    fn transfer(&mut self) {
        match self {
            ValueActivity::Dense { activity, mean, .. } => activity.clone_from(mean),
            ValueActivity::Sparse { activity, mean } => activity.clone_from(mean),
        }
    }
}

/// Activity-based search: branches on the variable whose domain has been reduced most often by
/// the recent decisions, relative to its domain size.
///
/// The search starts with a sampling phase, during which the driver is asked to restart after
/// every failure (see [`Brancher::requests_restart`]) and decisions are made at random. The
/// activity of every variable after each probe is folded into a running mean and variance;
/// sampling ends once the 95% confidence interval of every mean is small enough. The means then
/// become the initial activities.
///
/// After sampling, the activity of every free variable decays by [`ActivityOptions::aging`] per
/// decision and increases by 1 whenever the decision reduced its domain. A value is chosen by
/// its own activity, the number of variables its assignment reduced, averaged with a weight of
/// `1 / forget`; the least active value is preferred.
#[derive(Debug)]
pub struct ActivityBased {
    variables: Vec<VariableId>,
    options: ActivityOptions,
    activity: Vec<f64>,
    mean: Vec<f64>,
    variance_sum: Vec<f64>,
    value_activity: Vec<ValueActivity>,
    sampling: bool,
    probes: u32,
    /// The domain sizes before the current decision was applied.
    domain_sizes: Vec<u64>,
    /// The index of the variable and the value of the current decision.
    current: Option<(usize, i32)>,
    subscribed: bool,
    variable_tie_breaker: RandomTieBreaker<usize, f64>,
    value_tie_breaker: RandomTieBreaker<i32, f64>,
    statistics: ActivityStatistics,
}

impl ActivityBased {
    pub fn new(variables: &[VariableId], options: ActivityOptions) -> Self {
        if variables.is_empty() {
            warn!("The ActivityBased brancher was not provided with any variables");
        }
        ActivityBased {
            variables: variables.to_vec(),
            options,
            activity: vec![0.0; variables.len()],
            mean: vec![0.0; variables.len()],
            variance_sum: vec![0.0; variables.len()],
            value_activity: vec![],
            sampling: true,
            probes: 0,
            domain_sizes: vec![0; variables.len()],
            current: None,
            subscribed: false,
            variable_tie_breaker: RandomTieBreaker::new(Direction::Maximum),
            value_tie_breaker: RandomTieBreaker::new(Direction::Minimum),
            statistics: ActivityStatistics::default(),
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling
    }

    /// The number of sampling probes which have been completed.
    pub fn probes(&self) -> u32 {
        self.probes
    }

    /// The activity of `variable`, or [`None`] if the brancher does not branch on it.
    pub fn activity(&self, variable: VariableId) -> Option<f64> {
        self.variables
            .iter()
            .position(|&candidate| candidate == variable)
            .map(|index| self.activity[index])
    }

    fn ensure_value_tables(&mut self, model: &Model) {
        if self.value_activity.is_empty() {
            self.value_activity = self
                .variables
                .iter()
                .map(|&variable| {
                    ValueActivity::new(model.lower_bound(variable), model.upper_bound(variable))
                })
                .collect();
        }
    }

    fn select_value(&mut self, context: &mut SelectionContext, index: usize) -> i32 {
        let variable = self.variables[index];
        let lower_bound = context.lower_bound(variable);
        let enumerated = context.model().has_enumerated_domain(variable);

        if self.sampling {
            let size = context.domain_size(variable) as usize;
            let steps = context.random().generate_usize_in_range(0..size);
            if !enumerated {
                return lower_bound + steps as i32;
            }
            let mut value = lower_bound;
            for _ in 0..steps {
                value = context.model().next_value(variable, value);
            }
            return value;
        }

        let table = &self.value_activity[index];
        if !enumerated {
            let upper_bound = context.upper_bound(variable);
            let (lower_activity, upper_activity) =
                (table.activity(lower_bound), table.activity(upper_bound));
            return if lower_activity < upper_activity {
                lower_bound
            } else if upper_activity < lower_activity {
                upper_bound
            } else if context.random().generate_bool(0.5) {
                lower_bound
            } else {
                upper_bound
            };
        }

        let mut values = ValueIterator::new(variable);
        values.bottom_up_init(context.model());
        while values.has_next() {
            let value = values.next(context.model());
            self.value_tie_breaker.consider(value, table.activity(value));
        }
        self.value_tie_breaker
            .select(context.random())
            .unwrap_or(lower_bound)
    }

    /// Whether the confidence interval of the activity of the variable at `index` is small
    /// enough.
    fn has_converged(&self, model: &Model, index: usize) -> bool {
        if model.is_instantiated(self.variables[index]) {
            return true;
        }
        if self.probes < 2 {
            return false;
        }
        let probes = self.probes as f64;
        let standard_deviation = (self.variance_sum[index] / (probes - 1.0)).sqrt();
        let half_width = t_quantile(self.probes) * standard_deviation / probes.sqrt();
        let mean = self.mean[index];
        if mean == 0.0 && half_width == 0.0 {
            return true;
        }
        half_width / mean < self.options.interval_ratio
    }

    fn end_sampling(&mut self) {
        self.sampling = false;
        self.activity.clone_from(&self.mean);
        self.value_activity
            .iter_mut()
            .for_each(ValueActivity::transfer);
    }
}

impl Brancher for ActivityBased {
    fn init(&mut self, context: &mut SelectionContext) -> bool {
        self.ensure_value_tables(context.model());
        self.subscribed = true;
        true
    }

    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        self.ensure_value_tables(context.model());

        // While sampling, every free variable scores the same so the choice is uniform
        for (index, &variable) in self.variables.iter().enumerate() {
            let size = context.domain_size(variable);
            if size > 1 {
                let score = if self.sampling {
                    0.0
                } else {
                    self.activity[index] / size as f64
                };
                self.variable_tie_breaker.consider(index, score);
            }
        }
        let index = self.variable_tie_breaker.select(context.random())?;

        let value = self.select_value(context, index);
        self.current = Some((index, value));
        self.statistics.decisions += 1;
        Some(Decision::assign(self.variables[index], value))
    }

    fn remove(&mut self) {
        self.subscribed = false;
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }

    fn on_restart(&mut self, context: &mut SelectionContext) {
        if !self.sampling {
            return;
        }

        self.probes += 1;
        self.statistics.sampling_probes += 1;
        let probes = self.probes as f64;
        for index in 0..self.variables.len() {
            let activity = self.activity[index];
            let delta = activity - self.mean[index];
            self.mean[index] += delta / probes;
            self.variance_sum[index] += delta * (activity - self.mean[index]);
            self.activity[index] = 0.0;
            if let Some(table) = self.value_activity.get_mut(index) {
                table.update(self.probes);
            }
        }

        if self.probes <= self.options.min_sampling_iterations {
            return;
        }
        let converged =
            (0..self.variables.len()).all(|index| self.has_converged(context.model(), index));
        if converged {
            debug!("Activity sampling converged after {} probes", self.probes);
            self.end_sampling();
        } else if self.probes >= self.options.max_sampling_iterations {
            warn!(
                "Activity sampling did not converge within {} probes, stopping it",
                self.probes
            );
            self.end_sampling();
        }
    }

    fn before_down_branch(&mut self, context: &mut SelectionContext, left: bool) {
        if !left {
            return;
        }
        for (size, &variable) in self.domain_sizes.iter_mut().zip(&self.variables) {
            *size = context.domain_size(variable);
        }
    }

    fn after_down_branch(&mut self, context: &mut SelectionContext, left: bool) {
        if !left {
            return;
        }
        let Some((current_index, current_value)) = self.current.take() else {
            return;
        };

        let aging = if self.sampling { 1.0 } else { self.options.aging };
        let mut affected = 0;
        for (index, &variable) in self.variables.iter().enumerate() {
            let size = context.domain_size(variable);
            if size > 1 {
                self.activity[index] *= aging;
            }
            if size != self.domain_sizes[index] {
                self.activity[index] += 1.0;
                affected += 1;
            }
        }

        let table = &mut self.value_activity[current_index];
        let activity = table.activity(current_value);
        let forget = self.options.forget;
        let updated = if self.sampling {
            activity + affected as f64
        } else {
            (activity * (forget - 1.0) + affected as f64) / forget
        };
        table.set_activity(current_value, updated);
    }

    fn requests_restart(&self) -> bool {
        self.sampling
    }

    fn subscribe_to_events(&self) -> Vec<SearchEvent> {
        if self.subscribed {
            vec![SearchEvent::Restart, SearchEvent::DownBranch]
        } else {
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;
    use crate::basic_types::tests::TestRandom;
    use crate::engine::Cause;
    use crate::engine::NoPropagation;

    /// Makes a decision which reduces the domain of every free variable, then backtracks to the
    /// root and restarts.
    fn probe(brancher: &mut ActivityBased, context: &mut SelectionContext, variables: &[VariableId]) {
        let _ = brancher
            .next_decision(context)
            .expect("the variables are free");
        context.world_push();
        brancher.before_down_branch(context, true);
        for &variable in variables {
            let lower_bound = context.lower_bound(variable);
            let _ = context
                .model_mut()
                .remove_value(variable, lower_bound, Cause::Decision, &mut NoPropagation);
        }
        brancher.after_down_branch(context, true);
        context.world_pop();
        brancher.on_restart(context);
    }

    #[test]
    fn sampling_ends_once_the_minimum_number_of_probes_is_exceeded() {
        let mut model = Model::default();
        let variables = vec![
            model.new_enumerated_var("x", 0, 4),
            model.new_enumerated_var("y", 0, 4),
            model.new_bounded_var("z", 0, 4),
        ];
        let mut brancher = ActivityBased::new(
            &variables,
            ActivityOptions {
                min_sampling_iterations: 3,
                ..Default::default()
            },
        );

        let mut engine = NoPropagation;
        let mut rng = SmallRng::seed_from_u64(42);
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(brancher.init(&mut context));

        for _ in 0..3 {
            assert!(brancher.requests_restart());
            probe(&mut brancher, &mut context, &variables);
        }
        assert!(brancher.is_sampling());

        probe(&mut brancher, &mut context, &variables);
        assert!(!brancher.is_sampling());
        assert!(!brancher.requests_restart());
        assert_eq!(4, brancher.probes());
        assert_eq!(Some(1.0), brancher.activity(variables[0]));
    }

    #[test]
    fn sampling_is_stopped_at_the_maximum_number_of_probes() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 4);
        let y = model.new_enumerated_var("y", 0, 4);
        let mut brancher = ActivityBased::new(
            &[x, y],
            ActivityOptions {
                min_sampling_iterations: 1,
                max_sampling_iterations: 3,
                ..Default::default()
            },
        );

        let mut engine = NoPropagation;
        let mut rng = SmallRng::seed_from_u64(7);
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(brancher.init(&mut context));

        // Only x is reduced, and only on every other probe, so its activity never converges
        for probe_index in 0..3 {
            let _ = brancher.next_decision(&mut context);
            context.world_push();
            brancher.before_down_branch(&mut context, true);
            if probe_index % 2 == 0 {
                let _ = context
                    .model_mut()
                    .remove_value(x, 0, Cause::Decision, &mut NoPropagation);
            }
            brancher.after_down_branch(&mut context, true);
            context.world_pop();
            brancher.on_restart(&mut context);
        }

        assert!(!brancher.is_sampling());
        assert_eq!(3, brancher.probes());
    }

    #[test]
    fn after_sampling_the_least_active_value_is_chosen() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let mut brancher = ActivityBased::new(&[x], ActivityOptions::default());

        let mut engine = NoPropagation;
        let mut rng = TestRandom::default();
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(brancher.init(&mut context));

        brancher.end_sampling();
        brancher.value_activity[0].set_activity(0, 3.0);
        brancher.value_activity[0].set_activity(1, 1.0);
        brancher.value_activity[0].set_activity(2, 2.0);

        assert_eq!(
            Some(Decision::assign(x, 1)),
            brancher.next_decision(&mut context)
        );
    }

    #[test]
    fn large_domains_keep_their_value_activities_in_a_map() {
        let mut table = ValueActivity::new(0, 10_000);
        assert!(matches!(table, ValueActivity::Sparse { .. }));

        table.set_activity(9_000, 2.0);
        table.update(2);
        table.transfer();
        assert_eq!(1.0, table.activity(9_000));
    }

    #[test]
    fn the_t_quantiles_shrink_with_the_number_of_probes() {
        assert_eq!(12.706, t_quantile(2));
        assert_eq!(2.023, t_quantile(40));
        assert_eq!(2.021, t_quantile(41));
        assert_eq!(2.021, t_quantile(60));
        assert_eq!(2.000, t_quantile(61));
        assert_eq!(1.969, t_quantile(250));
        assert_eq!(1.960, t_quantile(251));
        assert_eq!(1.960, t_quantile(1000));
    }

    #[test]
    fn sampling_picks_variables_regardless_of_their_activity() {
        let mut model = Model::default();
        let x = model.new_enumerated_var("x", 0, 2);
        let y = model.new_enumerated_var("y", 0, 2);
        let mut brancher = ActivityBased::new(&[x, y], ActivityOptions::default());
        brancher.activity[1] = 5.0;

        let mut engine = NoPropagation;
        // The first draw picks among the free variables, the second the value of the decision
        let mut rng = TestRandom {
            usizes: vec![0, 1],
            ..Default::default()
        };
        let mut context = SelectionContext::new(&mut model, &mut engine, &mut rng);
        assert!(brancher.init(&mut context));
        assert!(brancher.is_sampling());

        assert_eq!(
            Some(Decision::assign(x, 1)),
            brancher.next_decision(&mut context)
        );
    }
}
