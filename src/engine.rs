use anyhow::Result;

use crate::config::EngineConfig;
use crate::model::{HorizonAggregate, Player, ProjectionBreakdown, Round, TransferScore};
use crate::provider::SeasonData;
use crate::{expected_points, horizon, transfer};

/// Season data plus tuning, bundled for callers that make many requests.
pub struct Engine<'a, D: SeasonData + ?Sized> {
    data: &'a D,
    cfg: EngineConfig,
}

impl<'a, D: SeasonData + ?Sized> Engine<'a, D> {
    pub fn new(data: &'a D, cfg: EngineConfig) -> Self {
        Self { data, cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn project_expected_points(&self, player: &Player, round: &Round) -> Result<f64> {
        expected_points::project_expected_points(self.data, &self.cfg, player, round)
    }

    pub fn explain_expected_points(
        &self,
        player: &Player,
        round: &Round,
    ) -> Result<ProjectionBreakdown> {
        expected_points::explain_expected_points(self.data, &self.cfg, player, round)
    }

    pub fn project_this_round(&self, player: &Player) -> Result<f64> {
        expected_points::project_this_round(self.data, &self.cfg, player)
    }

    pub fn aggregate_horizon(
        &self,
        player: &Player,
        from_round: &Round,
        horizon: u32,
    ) -> Result<HorizonAggregate> {
        horizon::aggregate_horizon(self.data, &self.cfg, player, from_round, horizon)
    }

    pub fn score_transfer(
        &self,
        player: &Player,
        from_round: Option<&Round>,
        horizon: u32,
    ) -> Result<TransferScore> {
        transfer::score_transfer(self.data, &self.cfg, player, from_round, horizon)
    }

    pub fn rank_candidates(
        &self,
        pool: &[Player],
        from_round: Option<&Round>,
        horizon: u32,
        limit: Option<usize>,
    ) -> Result<Vec<TransferScore>> {
        transfer::rank_candidates(self.data, &self.cfg, pool, from_round, horizon, limit)
    }
}
