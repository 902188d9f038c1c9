use log::debug;
use log::warn;

use crate::branching::tie_breaking::Direction;
use crate::branching::tie_breaking::RandomTieBreaker;
use crate::branching::tie_breaking::TieBreaker;
use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SearchEvent;
use crate::branching::SelectionContext;
use crate::create_statistics_struct;
use crate::engine::Contradiction;
use crate::engine::Model;
use crate::engine::ValueIterator;
use crate::engine::VariableId;
use crate::environment::StoredDouble;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The options of [`ImpactBased`].
#[derive(Debug, Clone, Copy)]
pub struct ImpactOptions {
    /// The weight of the past impacts: a new measurement counts for `1 / aging`.
    pub aging: f64,
    /// Domains of at least `2^split` values are probed per sub-range instead of per value.
    pub split: u32,
    /// The impacts are measured again every `node_impact` decisions; 0 disables it.
    pub node_impact: u64,
    /// Only measure the impacts before search, never update them afterwards.
    pub init_only: bool,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        ImpactOptions {
            aging: 2.0,
            split: 9,
            node_impact: 2048,
            init_only: false,
        }
    }
}

create_statistics_struct!(ImpactStatistics {
    probes: u64,
    failed_probes: u64,
    reevaluations: u64,
    decisions: u64,
});

/// The restriction applied by one probe.
#[derive(Debug, Clone, Copy)]
enum Probe {
    Value(i32),
    Range(i32, i32),
}

/// The impacts of the values of one variable; bound domains share a single impact.
#[derive(Debug, Clone, Default)]
struct ImpactTable {
    offset: i32,
    impacts: Vec<f64>,
}

impl ImpactTable {
    fn slot(&self, value: i32) -> Option<usize> {
        if self.impacts.len() == 1 {
            return Some(0);
        }
        usize::try_from(value as i64 - self.offset as i64)
            .ok()
            .filter(|&index| index < self.impacts.len())
    }

    fn impact(&self, value: i32) -> f64 {
        self.slot(value).map_or(0.0, |index| self.impacts[index])
    }

    fn set(&mut self, from: i32, to: i32, impact: f64) {
        for value in from..=to {
            if let Some(index) = self.slot(value) {
                self.impacts[index] = impact;
            }
        }
    }

    fn age(&mut self, from: i32, to: i32, impact: f64, aging: f64) {
        for value in from..=to {
            if let Some(index) = self.slot(value) {
                let aged = &mut self.impacts[index];
                *aged = (*aged * (aging - 1.0) + impact) / aging;
            }
        }
    }
}

/// The logarithm of the size of the search space spanned by `variables`.
fn log_search_space(model: &Model, variables: &[VariableId]) -> f64 {
    variables
        .iter()
        .map(|&variable| (model.domain_size(variable) as f64).ln())
        .sum()
}

/// Impact-based search: branches on the variable whose assignments reduce the search space the
/// most, and assigns it the value reducing it the least.
///
/// The impact of an assignment is `1 - after / before`, where `before` and `after` are the sizes
/// of the search space (the product of the domain sizes) before and after propagating it; it is
/// 1 for an assignment which fails. Before search, every value of every free variable is probed
/// (or every sub-range, for large domains; bound domains are probed at both bounds and at the
/// middle). During search, the impact of every decision is measured and averaged into its
/// estimate, and all estimates are probed again every [`ImpactOptions::node_impact`] decisions.
///
/// A probe of an assignment which fails also probes the removal of the value; if that fails as
/// well, the model is inconsistent and [`Brancher::init`] returns `false`.
#[derive(Debug)]
pub struct ImpactBased {
    variables: Vec<VariableId>,
    options: ImpactOptions,
    tables: Vec<ImpactTable>,
    initialised: bool,
    learns_and_fails: bool,
    assignment_failed: bool,
    /// The logarithm of the search space size at the last measured decision.
    search_space: Option<StoredDouble>,
    /// The index of the variable and the value of the current decision.
    current: Option<(usize, i32)>,
    subscribed: bool,
    variable_tie_breaker: RandomTieBreaker<usize, f64>,
    value_tie_breaker: RandomTieBreaker<i32, f64>,
    statistics: ImpactStatistics,
}

impl ImpactBased {
    pub fn new(variables: &[VariableId], options: ImpactOptions) -> Self {
        if variables.is_empty() {
            warn!("The ImpactBased brancher was not provided with any variables");
        }
        ImpactBased {
            variables: variables.to_vec(),
            options,
            tables: vec![ImpactTable::default(); variables.len()],
            initialised: false,
            learns_and_fails: false,
            assignment_failed: false,
            search_space: None,
            current: None,
            subscribed: false,
            variable_tie_breaker: RandomTieBreaker::new(Direction::Maximum),
            value_tie_breaker: RandomTieBreaker::new(Direction::Minimum),
            statistics: ImpactStatistics::default(),
        }
    }

    /// The estimated impact of assigning `value` to `variable`.
    pub fn impact(&self, variable: VariableId, value: i32) -> Option<f64> {
        self.variables
            .iter()
            .position(|&candidate| candidate == variable)
            .map(|index| self.tables[index].impact(value))
    }

    /// Applies `probe` to `variable` in a new world, measures the reduction of the search space
    /// and restores the state.
    fn probe(
        &mut self,
        context: &mut SelectionContext,
        variable: VariableId,
        probe: Probe,
        before: f64,
    ) -> f64 {
        self.statistics.probes += 1;
        context.world_push();
        let applied = match probe {
            Probe::Value(value) => context.instantiate_to(variable, value),
            Probe::Range(from, to) => context.update_bounds(variable, from, to),
        }
        .and_then(|_| context.propagate());

        let impact = match applied {
            Ok(()) => {
                let after = log_search_space(context.model(), &self.variables);
                1.0 - (after - before).exp()
            }
            Err(_) => {
                self.statistics.failed_probes += 1;
                context.flush();
                context.world_pop();
                context.world_push();

                let removed = match probe {
                    Probe::Value(value) => context.remove_value(variable, value),
                    Probe::Range(from, to) => context.remove_interval(variable, from, to),
                }
                .and_then(|_| context.propagate());
                if removed.is_err() {
                    self.learns_and_fails = true;
                    context.flush();
                }
                1.0
            }
        };
        context.world_pop();
        impact
    }

    /// Probes the variable at `index`, returning the impacts per range of values.
    fn estimate(
        &mut self,
        context: &mut SelectionContext,
        index: usize,
        before: f64,
    ) -> Vec<(i32, i32, f64)> {
        let variable = self.variables[index];
        let lower_bound = context.lower_bound(variable);
        let upper_bound = context.upper_bound(variable);

        if !context.model().has_enumerated_domain(variable) {
            let middle = ((lower_bound as i64 + upper_bound as i64) / 2) as i32;
            let impact = [lower_bound, upper_bound, middle]
                .into_iter()
                .map(|value| self.probe(context, variable, Probe::Value(value), before))
                .sum::<f64>()
                / 3.0;
            return vec![(lower_bound, upper_bound, impact)];
        }

        let mut values = vec![];
        let mut iterator = ValueIterator::new(variable);
        iterator.bottom_up_init(context.model());
        while iterator.has_next() {
            values.push(iterator.next(context.model()));
        }

        let parts = 2_u64.saturating_pow(self.options.split);
        if (values.len() as u64) < parts {
            return values
                .into_iter()
                .map(|value| {
                    let impact = self.probe(context, variable, Probe::Value(value), before);
                    (value, value, impact)
                })
                .collect();
        }

        let amplitude = upper_bound as i64 - lower_bound as i64 + 1;
        let chunk = (amplitude as u64 / parts).max(1) as usize;
        values
            .chunks(chunk + 1)
            .map(|range| {
                let (from, to) = (range[0], range[range.len() - 1]);
                let impact = self.probe(context, variable, Probe::Range(from, to), before);
                (from, to, impact)
            })
            .collect()
    }

    fn initialise(&mut self, context: &mut SelectionContext) -> bool {
        self.initialised = true;
        self.learns_and_fails = false;

        let before = log_search_space(context.model(), &self.variables);
        let cell = context.model_mut().environment_mut().make_double(before);
        self.search_space = Some(cell);

        for index in 0..self.variables.len() {
            let variable = self.variables[index];
            if context.is_instantiated(variable) {
                continue;
            }
            let lower_bound = context.lower_bound(variable);
            let slots = if context.model().has_enumerated_domain(variable) {
                (context.upper_bound(variable) as i64 - lower_bound as i64 + 1) as usize
            } else {
                1
            };
            self.tables[index] = ImpactTable {
                offset: lower_bound,
                impacts: vec![0.0; slots],
            };

            for (from, to, impact) in self.estimate(context, index, before) {
                self.tables[index].set(from, to, impact);
            }
        }

        debug!(
            "Impact initialisation made {} probes ({} failed)",
            self.statistics.probes, self.statistics.failed_probes
        );
        if self.learns_and_fails {
            self.learns_and_fails = false;
            return false;
        }
        true
    }

    fn reevaluate(&mut self, context: &mut SelectionContext) {
        self.statistics.reevaluations += 1;
        let before = log_search_space(context.model(), &self.variables);
        for index in 0..self.variables.len() {
            if context.is_instantiated(self.variables[index]) {
                continue;
            }
            for (from, to, impact) in self.estimate(context, index, before) {
                self.tables[index].age(from, to, impact, self.options.aging);
            }
        }
        self.learns_and_fails = false;
    }

    fn select_value(&mut self, context: &mut SelectionContext, index: usize) -> i32 {
        let variable = self.variables[index];
        let lower_bound = context.lower_bound(variable);

        if !context.model().has_enumerated_domain(variable) {
            let upper_bound = context.upper_bound(variable);
            return if context.random().generate_bool(0.5) {
                lower_bound
            } else {
                upper_bound
            };
        }

        let table = &self.tables[index];
        let mut values = ValueIterator::new(variable);
        values.bottom_up_init(context.model());
        while values.has_next() {
            let value = values.next(context.model());
            self.value_tie_breaker.consider(value, table.impact(value));
        }
        self.value_tie_breaker
            .select(context.random())
            .unwrap_or(lower_bound)
    }

    /// The sum of the impacts of the values of the variable at `index`, minus its domain size.
    fn variable_impact(&self, model: &Model, index: usize) -> f64 {
        let variable = self.variables[index];
        let table = &self.tables[index];
        let size = model.domain_size(variable) as f64;
        if !model.has_enumerated_domain(variable) {
            return table.impact(model.lower_bound(variable)) - size;
        }

        let mut total = 0.0;
        let mut values = ValueIterator::new(variable);
        values.bottom_up_init(model);
        while values.has_next() {
            total += table.impact(values.next(model));
        }
        total - size
    }
}

impl Brancher for ImpactBased {
    fn init(&mut self, context: &mut SelectionContext) -> bool {
        if !self.options.init_only {
            self.subscribed = true;
        }
        self.initialise(context)
    }

    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        if !self.initialised {
            let _ = self.initialise(context);
        }
        let node_impact = self.options.node_impact;
        if !self.options.init_only
            && node_impact > 0
            && self.statistics.decisions > 0
            && self.statistics.decisions % node_impact == 0
        {
            self.reevaluate(context);
        }

        for index in 0..self.variables.len() {
            if !context.is_instantiated(self.variables[index]) {
                let impact = self.variable_impact(context.model(), index);
                self.variable_tie_breaker.consider(index, impact);
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

    fn on_contradiction(&mut self, _context: &mut SelectionContext, _contradiction: &Contradiction) {
        self.assignment_failed = true;
    }

    fn after_down_branch(&mut self, context: &mut SelectionContext, left: bool) {
        if !left {
            return;
        }
        if let Some((index, value)) = self.current.take() {
            let impact = if self.assignment_failed {
                1.0
            } else {
                let after = log_search_space(context.model(), &self.variables);
                match self.search_space {
                    Some(cell) => {
                        let before = context.model().environment().get_double(cell);
                        context.model_mut().environment_mut().set_double(cell, after);
                        1.0 - (after - before).exp()
                    }
                    None => 0.0,
                }
            };
            self.tables[index].age(value, value, impact, self.options.aging);
        }
        self.assignment_failed = false;
    }

    fn subscribe_to_events(&self) -> Vec<SearchEvent> {
        if self.subscribed {
            vec![SearchEvent::Contradiction, SearchEvent::DownBranch]
        } else {
            vec![]
        }
    }
}
