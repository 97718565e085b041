use serde::Deserialize;

/// Index of a combatant inside one battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct CombatantId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Saucy,
    Clumsy,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saucy => "saucy",
            Self::Clumsy => "clumsy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Status {
    pub kind: StatusKind,
    pub expires_in: u32,
}

/// Stat block as written in content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombatantDef {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    pub id: CombatantId,
    pub team: Team,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub status: Option<Status>,
    pub actions: Vec<String>,
    pub blinking: bool,
}

impl Combatant {
    pub fn from_def(id: CombatantId, team: Team, def: &CombatantDef) -> Self {
        Self {
            id,
            team,
            name: def.name.clone(),
            hp: def.hp.min(def.max_hp),
            max_hp: def.max_hp,
            status: def.status,
            actions: def.actions.clone(),
            blinking: false,
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    pub fn knows(&self, action: &str) -> bool {
        self.actions.iter().any(|known| known == action)
    }

    /// hp = max(0, hp - damage).
    pub fn take_damage(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }

    /// hp = min(max_hp, hp + amount).
    pub fn recover(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }
}
