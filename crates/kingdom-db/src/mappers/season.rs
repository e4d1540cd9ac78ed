//! Season mapper

use kingdom_core::entities::Season;
use kingdom_core::value_objects::Snowflake;

use crate::models::SeasonModel;

impl From<SeasonModel> for Season {
    fn from(model: SeasonModel) -> Self {
        Season {
            id: Snowflake::new(model.id),
            name: model.name,
            kingdom: model.kingdom,
            started_at: model.started_at,
            ended_at: model.ended_at,
        }
    }
}
