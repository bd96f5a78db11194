//! Pure rendering of world state into a text frame.

use crate::world::World;
use comm_core::{FactionId, FactionTable, Position, Terrain};
use std::fmt::Write as _;

/// Colour class of a rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Terrain(Terrain),
    Territory(FactionId),
    Soldier(FactionId),
}

impl Tint {
    /// ANSI SGR parameters for this tint
    pub fn ansi_code(&self) -> &'static str {
        match self {
            Tint::Terrain(Terrain::Ground) => "37",
            Tint::Terrain(Terrain::Water) => "36",
            Tint::Terrain(Terrain::Rock) => "90",
            Tint::Terrain(Terrain::Vegetation) => "32",
            Tint::Terrain(Terrain::Border) => "97",
            Tint::Territory(faction) => faction_color(*faction),
            Tint::Soldier(FactionId::A) => "1;91",
            Tint::Soldier(FactionId::B) => "1;94",
            Tint::Soldier(FactionId::C) => "1;93",
            Tint::Soldier(FactionId::D) => "1;95",
        }
    }
}

fn faction_color(faction: FactionId) -> &'static str {
    match faction {
        FactionId::A => "31",
        FactionId::B => "34",
        FactionId::C => "33",
        FactionId::D => "35",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tint: Tint,
}

/// One rendered picture of the world plus its statistics block
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tick: u64,
    pub rows: Vec<Vec<Glyph>>,
    pub summary: Vec<String>,
}

impl Frame {
    pub fn glyph_at(&self, x: usize, y: usize) -> Option<&Glyph> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Text without escape codes
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.extend(row.iter().map(|g| g.ch));
            out.push('\n');
        }
        for line in &self.summary {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Text with ANSI colour escapes; runs of the same tint share one escape
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let mut current: Option<Tint> = None;
            for glyph in row {
                if current != Some(glyph.tint) {
                    let _ = write!(out, "\x1b[{}m", glyph.tint.ansi_code());
                    current = Some(glyph.tint);
                }
                out.push(glyph.ch);
            }
            out.push_str("\x1b[0m\n");
        }
        for line in &self.summary {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Soldiers draw over territory, territory draws over terrain
pub fn render(world: &World, factions: &FactionTable) -> Frame {
    let width = world.width().max(0) as usize;
    let height = world.height().max(0) as usize;

    let mut rows: Vec<Vec<Glyph>> = Vec::with_capacity(height);
    for y in 0..height {
        let mut row = Vec::with_capacity(width);
        for x in 0..width {
            row.push(base_glyph(world, x as i32, y as i32));
        }
        rows.push(row);
    }

    for soldier in world.soldiers() {
        let (x, y) = (soldier.position.x as usize, soldier.position.y as usize);
        if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = Glyph {
                ch: soldier.faction.letter(),
                tint: Tint::Soldier(soldier.faction),
            };
        }
    }

    Frame {
        tick: world.tick(),
        rows,
        summary: summary_lines(world, factions),
    }
}

fn base_glyph(world: &World, x: i32, y: i32) -> Glyph {
    let pos = Position::new(x, y);
    if let Some(owner) = world.owner(pos) {
        return Glyph {
            ch: owner.letter().to_ascii_lowercase(),
            tint: Tint::Territory(owner),
        };
    }
    let terrain = world.terrain_at(pos).unwrap_or(Terrain::Border);
    Glyph {
        ch: terrain.glyph(),
        tint: Tint::Terrain(terrain),
    }
}

fn summary_lines(world: &World, factions: &FactionTable) -> Vec<String> {
    let mut lines = vec![format!(
        "Year {}  |  soldiers in the field: {}",
        world.tick(),
        world.soldiers().len()
    )];

    for (id, traits) in factions.iter() {
        let Some(stats) = world.stats().get(id) else {
            continue;
        };
        let victims: Vec<String> = stats
            .destroyed_by_victim
            .iter()
            .map(|(victim, n)| format!("{}:{}", victim, n))
            .collect();
        let status = match stats.eliminated_at {
            Some(tick) if stats.is_eliminated() => format!("  (eliminated in year {})", tick),
            _ => String::new(),
        };
        lines.push(format!(
            "{}  cells {:>5}  peak {:>5}  destroyed {:>4} [{}]  decayed {:>4}  soldiers {:>3}{}",
            id,
            stats.owned_cells,
            stats.peak_cells,
            stats.cells_destroyed,
            victims.join(" "),
            stats.cells_decayed,
            stats.soldiers_alive,
            status
        ));
        lines.push(format!(
            "   growth {:.2}  aggression {:.2}  adaptability {:.2}  resilience {:.2}  mobility {:.2}",
            traits.growth, traits.aggression, traits.adaptability, traits.resilience, traits.mobility
        ));
    }
    lines
}
