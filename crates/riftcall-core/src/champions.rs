// Champion directory: champion id -> display name.
//
// Static data shipped with the binary. Unknown ids resolve to a synthesized
// label so lookups never fail.

use std::collections::HashMap;

/// `(id, name, note)` rows. The note is a one-line play-style hint for
/// champions newer than most language-model training data.
const CHAMPIONS: &[(i64, &str, Option<&str>)] = &[
    (1, "Annie", None),
    (2, "Olaf", None),
    (3, "Galio", None),
    (4, "Twisted Fate", None),
    (5, "Xin Zhao", None),
    (6, "Urgot", None),
    (7, "LeBlanc", None),
    (8, "Vladimir", None),
    (9, "Fiddlesticks", None),
    (10, "Kayle", None),
    (11, "Master Yi", None),
    (12, "Alistar", None),
    (13, "Ryze", None),
    (14, "Sion", None),
    (15, "Sivir", None),
    (16, "Soraka", None),
    (17, "Teemo", None),
    (18, "Tristana", None),
    (19, "Warwick", None),
    (20, "Nunu", None),
    (21, "Miss Fortune", None),
    (22, "Ashe", None),
    (23, "Tryndamere", None),
    (24, "Jax", None),
    (25, "Morgana", None),
    (26, "Zilean", None),
    (27, "Singed", None),
    (28, "Evelynn", None),
    (29, "Twitch", None),
    (30, "Karthus", None),
    (31, "Cho'Gath", None),
    (32, "Amumu", None),
    (33, "Rammus", None),
    (34, "Anivia", None),
    (35, "Shaco", None),
    (36, "Dr. Mundo", None),
    (37, "Sona", None),
    (38, "Kassadin", None),
    (39, "Irelia", None),
    (40, "Janna", None),
    (41, "Gangplank", None),
    (42, "Corki", None),
    (43, "Karma", None),
    (44, "Taric", None),
    (45, "Veigar", None),
    (48, "Trundle", None),
    (50, "Swain", None),
    (51, "Caitlyn", None),
    (53, "Blitzcrank", None),
    (54, "Malphite", None),
    (55, "Katarina", None),
    (56, "Nocturne", None),
    (57, "Maokai", None),
    (58, "Renekton", None),
    (59, "Jarvan IV", None),
    (60, "Elise", None),
    (61, "Orianna", None),
    (62, "Wukong", None),
    (63, "Brand", None),
    (64, "Lee Sin", None),
    (67, "Vayne", None),
    (68, "Rumble", None),
    (69, "Cassiopeia", None),
    (72, "Skarner", None),
    (74, "Heimerdinger", None),
    (75, "Nasus", None),
    (76, "Nidalee", None),
    (77, "Udyr", None),
    (78, "Poppy", None),
    (79, "Gragas", None),
    (80, "Pantheon", None),
    (81, "Ezreal", None),
    (82, "Mordekaiser", None),
    (83, "Yorick", None),
    (84, "Akali", None),
    (85, "Kennen", None),
    (86, "Garen", None),
    (89, "Leona", None),
    (90, "Malzahar", None),
    (91, "Talon", None),
    (92, "Riven", None),
    (96, "Kog'Maw", None),
    (98, "Shen", None),
    (99, "Lux", None),
    (101, "Xerath", None),
    (102, "Shyvana", None),
    (103, "Ahri", None),
    (104, "Graves", None),
    (105, "Fizz", None),
    (106, "Volibear", None),
    (107, "Rengar", None),
    (110, "Varus", None),
    (111, "Nautilus", None),
    (112, "Viktor", None),
    (113, "Sejuani", None),
    (114, "Fiora", None),
    (115, "Ziggs", None),
    (117, "Lulu", None),
    (119, "Draven", None),
    (120, "Hecarim", None),
    (121, "Kha'Zix", None),
    (122, "Darius", None),
    (126, "Jayce", None),
    (127, "Lissandra", None),
    (131, "Diana", None),
    (133, "Quinn", None),
    (134, "Syndra", None),
    (136, "Aurelion Sol", None),
    (141, "Kayn", None),
    (142, "Zoe", None),
    (143, "Zyra", None),
    (145, "Kai'Sa", None),
    (147, "Seraphine", None),
    (150, "Gnar", None),
    (154, "Zac", None),
    (157, "Yasuo", None),
    (161, "Vel'Koz", None),
    (163, "Taliyah", None),
    (164, "Camille", None),
    (166, "Akshan", None),
    (200, "Bel'Veth", None),
    (201, "Braum", None),
    (202, "Jhin", None),
    (203, "Kindred", None),
    (221, "Zeri", None),
    (222, "Jinx", None),
    (223, "Tahm Kench", None),
    (233, "Briar", None),
    (234, "Viego", None),
    (235, "Senna", None),
    (236, "Lucian", None),
    (238, "Zed", None),
    (240, "Kled", None),
    (245, "Ekko", None),
    (246, "Qiyana", None),
    (254, "Vi", None),
    (266, "Aatrox", None),
    (267, "Nami", None),
    (268, "Azir", None),
    (350, "Yuumi", None),
    (360, "Samira", None),
    (412, "Thresh", None),
    (420, "Illaoi", None),
    (421, "Rek'Sai", None),
    (427, "Ivern", None),
    (429, "Kalista", None),
    (432, "Bard", None),
    (497, "Rakan", None),
    (498, "Xayah", None),
    (516, "Ornn", None),
    (517, "Sylas", None),
    (518, "Neeko", None),
    (523, "Aphelios", None),
    (526, "Rell", None),
    (555, "Pyke", None),
    (711, "Vex", None),
    (777, "Yone", None),
    (799, "Ambessa", Some("top lane bruiser, dash on every ability, ult is a long-range skillshot teleport onto the backline")),
    (800, "Mel", Some("AP scaling mage with long range and an executing ult")),
    (804, "Yunara", Some("sustained-damage ADC with area damage")),
    (875, "Sett", None),
    (876, "Lillia", None),
    (887, "Gwen", None),
    (888, "Renata Glasc", None),
    (893, "Aurora", Some("mid lane mage with dashes, slows and heavy zone control")),
    (895, "Nilah", None),
    (897, "K'Sante", None),
    (901, "Smolder", Some("late-scaling ADC with true damage and some area damage")),
    (902, "Milio", None),
    (904, "Zaheen", Some("AD top lane bruiser whose passive revives him at 12 stacks")),
    (910, "Hwei", Some("AP scaling mage")),
    (950, "Naafiri", None),
];

/// A resolved directory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChampionInfo {
    pub name: String,
    pub note: Option<String>,
}

/// Id -> name lookup table.
#[derive(Debug, Clone)]
pub struct ChampionDirectory {
    entries: HashMap<i64, ChampionInfo>,
}

impl Default for ChampionDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChampionDirectory {
    /// The directory shipped with the binary.
    pub fn builtin() -> Self {
        Self::from_entries(
            CHAMPIONS
                .iter()
                .map(|(id, name, note)| (*id, name.to_string(), note.map(str::to_string))),
        )
    }

    /// Build a directory from arbitrary rows. Later rows win on duplicate ids.
    pub fn from_entries<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, String, Option<String>)>,
    {
        let entries = rows
            .into_iter()
            .map(|(id, name, note)| (id, ChampionInfo { name, note }))
            .collect();
        ChampionDirectory { entries }
    }

    /// Display name for `champion_id`. Total: unknown ids get a placeholder.
    pub fn resolve_name(&self, champion_id: i64) -> String {
        match self.entries.get(&champion_id) {
            Some(info) => info.name.clone(),
            None => unknown_label(champion_id),
        }
    }

    pub fn note(&self, champion_id: i64) -> Option<&str> {
        self.entries.get(&champion_id)?.note.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unknown_label(champion_id: i64) -> String {
    format!("Unknown Champion ({champion_id})")
}
