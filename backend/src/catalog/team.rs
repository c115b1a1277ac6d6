use super::PricingCatalog;
use crate::error::ValidationErrors;
use crate::models::{is_well_formed_contact, Gender, SelectedGames, TeamMember, TeamRoster};

/// Extra players one selected team game needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRequirement {
    pub game: String,
    /// Team size minus the registrant
    pub required_additional: usize,
}

/// Derives team slots per selected game and checks the supplied roster fills them
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamCompositionValidator {
    catalog: PricingCatalog,
}

impl TeamCompositionValidator {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self { catalog }
    }

    /// Team requirements for `games`. Any game not offered to `gender` is an error.
    pub fn requirements(
        &self,
        games: &SelectedGames,
        gender: Gender,
    ) -> Result<Vec<TeamRequirement>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut requirements = Vec::new();

        for game in games.iter() {
            match self.catalog.team_size_of(game, gender) {
                None => errors.push(
                    "selectedGames",
                    format!("{} is not available for {}", game, gender),
                ),
                Some(players) if players > 1 => requirements.push(TeamRequirement {
                    game: game.to_string(),
                    required_additional: (players - 1) as usize,
                }),
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(requirements)
        } else {
            Err(errors)
        }
    }

    /// Check the roster against the selected team games and return it trimmed
    /// down to those games, with member fields trimmed.
    pub fn validate(
        &self,
        games: &SelectedGames,
        gender: Gender,
        roster: &TeamRoster,
    ) -> Result<TeamRoster, ValidationErrors> {
        let requirements = self.requirements(games, gender)?;
        let mut errors = ValidationErrors::new();
        let mut accepted = TeamRoster::new();

        for requirement in requirements {
            let field = format!("teamMembers.{}", requirement.game);
            let members: Vec<TeamMember> = roster
                .get(&requirement.game)
                .map(|members| members.iter().map(normalize_member).collect())
                .unwrap_or_default();

            if members.len() != requirement.required_additional {
                errors.push(
                    field.clone(),
                    format!(
                        "{} requires {} additional players, got {}",
                        requirement.game,
                        requirement.required_additional,
                        members.len()
                    ),
                );
            }

            for (index, member) in members.iter().enumerate() {
                if member.name.is_empty() {
                    errors.push(format!("{}[{}].name", field, index), "Name is required");
                }
                if member.roll_number.is_empty() {
                    errors.push(
                        format!("{}[{}].rollNumber", field, index),
                        "Roll number is required",
                    );
                }
                if !member.contact_number.is_empty()
                    && !is_well_formed_contact(&member.contact_number)
                {
                    errors.push(
                        format!("{}[{}].contactNumber", field, index),
                        "Contact number must look like 03XX-XXXXXXX",
                    );
                }
            }

            accepted.insert(requirement.game, members);
        }

        if errors.is_empty() {
            Ok(accepted)
        } else {
            Err(errors)
        }
    }
}

fn normalize_member(member: &TeamMember) -> TeamMember {
    TeamMember {
        name: member.name.trim().to_string(),
        roll_number: member.roll_number.trim().to_string(),
        contact_number: member.contact_number.trim().to_string(),
    }
}
