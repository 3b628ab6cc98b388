use serde::{Deserialize, Serialize};

use super::ids::LandId;
use super::season::{Season, SeasonSpan};
use super::task::Task;

/// One named quack rank and the lifetime quack count that earns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuackRank {
    pub name: String,
    #[serde(rename = "quacksRequired")]
    pub quacks_required: u64,
}

/// The process-wide simulation singleton: calendar, tuning knobs, and the
/// pending task queue. Loaded fresh at the start of every tick and written
/// back with the rest of the world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    #[serde(rename = "dayCounter")]
    pub day_counter: u64,
    #[serde(rename = "currentSeason")]
    pub current_season: Season,
    pub seasons: Vec<SeasonSpan>,

    #[serde(rename = "qqExchangeRate")]
    pub qq_exchange_rate: i64,
    /// Inclusive bounds the exchange rate is re-rolled within each tick.
    #[serde(rename = "qqExchangeRateRange")]
    pub qq_exchange_rate_range: (i64, i64),

    #[serde(rename = "landLimit")]
    pub land_limit: usize,
    /// Income fraction lost per land held beyond the limit.
    #[serde(rename = "landIncomePenaltyPercentPerLand")]
    pub land_income_penalty_percent_per_land: f64,

    #[serde(rename = "qualityImprovementProbability")]
    pub quality_improvement_probability: f64,
    #[serde(rename = "qualityDecayProbability")]
    pub quality_decay_probability: f64,
    /// Chance that hiring one native troop costs the land a point of quality.
    #[serde(rename = "qualityDrainOnHireProbability")]
    pub quality_drain_on_hire_probability: f64,
    #[serde(rename = "baseMaxQuality")]
    pub base_max_quality: u32,

    #[serde(rename = "maxCasualtiesAttackers")]
    pub max_casualties_attackers: f64,
    #[serde(rename = "maxCasualtiesDefenders")]
    pub max_casualties_defenders: f64,

    /// Ordered coarsest-to-finest; rank recomputation picks the last entry
    /// whose requirement is met.
    #[serde(rename = "quackRanks")]
    pub quack_ranks: Vec<QuackRank>,
    #[serde(rename = "maxQuackStreakLength")]
    pub max_quack_streak_length: u32,
    #[serde(rename = "quackStreakReward")]
    pub quack_streak_reward: u64,

    #[serde(rename = "safetyPeriodDays")]
    pub safety_period_days: u32,
    /// Flat income added to each owned land per banked support point.
    #[serde(rename = "supportIncomeBonus")]
    pub support_income_bonus: i64,

    #[serde(rename = "landCounter")]
    pub land_counter: LandId,
    pub task_queue: Vec<Task>,
}

impl GlobalConfig {
    /// Next fresh land id, advancing the counter.
    pub fn allocate_land_id(&mut self) -> LandId {
        let id = self.land_counter;
        self.land_counter += 1;
        id
    }

    /// Season the calendar says `day` falls in.
    pub fn season_for_day(&self, day: u64) -> Season {
        super::season::season_on_day(&self.seasons, day)
    }

    /// The configured rank earned by `quacks` lifetime quacks, if any: the
    /// last listed entry whose requirement is met.
    pub fn rank_for_quacks(&self, quacks: u64) -> Option<&QuackRank> {
        self.quack_ranks
            .iter()
            .filter(|r| quacks >= r.quacks_required)
            .last()
    }

    /// The first rank strictly above the given one, for "N quacks to go"
    /// style readouts.
    pub fn next_rank_after(&self, rank_name: &str) -> Option<&QuackRank> {
        let current = self
            .quack_ranks
            .iter()
            .find(|r| r.name == rank_name)
            .map(|r| r.quacks_required)
            .unwrap_or(0);
        self.quack_ranks
            .iter()
            .filter(|r| r.quacks_required > current)
            .min_by_key(|r| r.quacks_required)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            day_counter: 0,
            current_season: Season::Spring,
            seasons: [Season::Spring, Season::Summer, Season::Fall, Season::Winter]
                .into_iter()
                .map(|season| SeasonSpan {
                    season,
                    length_days: 90,
                })
                .collect(),
            qq_exchange_rate: 10,
            qq_exchange_rate_range: (5, 15),
            land_limit: 3,
            land_income_penalty_percent_per_land: 0.25,
            quality_improvement_probability: 0.5,
            quality_decay_probability: 0.25,
            quality_drain_on_hire_probability: 0.1,
            base_max_quality: 10,
            max_casualties_attackers: 0.75,
            max_casualties_defenders: 0.9,
            quack_ranks: Vec::new(),
            max_quack_streak_length: 7,
            quack_streak_reward: 3,
            safety_period_days: 14,
            support_income_bonus: 1,
            land_counter: 1,
            task_queue: Vec::new(),
        }
    }
}
