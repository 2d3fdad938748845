#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombatState {
    PlayerTurn,
    NpcTurn,
    PlayerDefeated,
    NpcDefeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CombatSide {
    Player,
    Npc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CombatTurnReport {
    attacker: CombatSide,
    damage: i32,
    player_hp: i32,
    npc_hp: i32,
    state_after: CombatState,
}

/// Strictly alternating damage exchange, player first. No randomness: hit
/// points and attack strengths fully determine the outcome, and terminal
/// states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CombatSession {
    state: CombatState,
}

impl CombatSession {
    fn new() -> Self {
        Self {
            state: CombatState::PlayerTurn,
        }
    }

    fn state(&self) -> CombatState {
        self.state
    }

    fn is_over(&self) -> bool {
        matches!(
            self.state,
            CombatState::PlayerDefeated | CombatState::NpcDefeated
        )
    }

    fn advance_turn(&mut self, player: &mut Actor, npc: &mut Actor) -> Option<CombatTurnReport> {
        let attacker = match self.state {
            CombatState::PlayerTurn => CombatSide::Player,
            CombatState::NpcTurn => CombatSide::Npc,
            CombatState::PlayerDefeated | CombatState::NpcDefeated => return None,
        };

        let damage = match attacker {
            CombatSide::Player => {
                npc.hp -= player.attack_strength;
                self.state = if npc.hp <= 0 {
                    CombatState::NpcDefeated
                } else {
                    CombatState::NpcTurn
                };
                player.attack_strength
            }
            CombatSide::Npc => {
                player.hp -= npc.attack_strength;
                self.state = if player.hp <= 0 {
                    CombatState::PlayerDefeated
                } else {
                    CombatState::PlayerTurn
                };
                npc.attack_strength
            }
        };

        Some(CombatTurnReport {
            attacker,
            damage,
            player_hp: player.hp,
            npc_hp: npc.hp,
            state_after: self.state,
        })
    }
}
