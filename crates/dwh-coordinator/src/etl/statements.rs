//! SQL for the staging tables and the song-play star schema
//!
//! Staging tables mirror the raw JSON in S3. `songplays` is the fact table;
//! `users`, `songs`, `artists` and `time` are its dimensions.

use crate::config::S3Sources;

/// One named SQL statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: &'static str,
    pub sql: String,
}

impl Statement {
    fn new(name: &'static str, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
        }
    }
}

/// Tables in drop and create order
pub const TABLES: [&str; 7] = [
    "staging_events",
    "staging_songs",
    "songplays",
    "users",
    "songs",
    "artists",
    "time",
];

const STAGING_EVENTS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS staging_events (
    artist          TEXT,
    auth            TEXT,
    firstName       TEXT,
    gender          TEXT,
    itemInSession   INT,
    lastName        TEXT,
    length          FLOAT,
    level           TEXT,
    location        TEXT,
    method          TEXT,
    page            TEXT,
    registration    BIGINT,
    sessionId       INT,
    song            TEXT,
    status          INT,
    ts              BIGINT,
    userAgent       TEXT,
    userId          INT
);
";

const STAGING_SONGS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS staging_songs (
    num_songs        INT,
    artist_id        TEXT,
    artist_latitude  FLOAT,
    artist_longitude FLOAT,
    artist_location  TEXT,
    artist_name      TEXT,
    song_id          TEXT,
    title            TEXT,
    duration         FLOAT,
    year             INT
);
";

const SONGPLAYS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS songplays (
    songplay_id INT IDENTITY(0,1) PRIMARY KEY,
    start_time  TIMESTAMP NOT NULL,
    user_id     INT NOT NULL,
    level       TEXT,
    song_id     TEXT,
    artist_id   TEXT,
    session_id  INT,
    location    TEXT,
    user_agent  TEXT
);
";

const USERS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id    INT PRIMARY KEY,
    first_name TEXT,
    last_name  TEXT,
    gender     TEXT,
    level      TEXT
);
";

const SONGS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS songs (
    song_id   TEXT PRIMARY KEY,
    title     TEXT,
    artist_id TEXT,
    year      INT,
    duration  FLOAT
);
";

const ARTISTS_CREATE: &str = "
CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY,
    name      TEXT,
    location  TEXT,
    latitude  FLOAT,
    longitude FLOAT
);
";

const TIME_CREATE: &str = "
CREATE TABLE IF NOT EXISTS time (
    start_time TIMESTAMP PRIMARY KEY,
    hour       INT,
    day        INT,
    week       INT,
    month      INT,
    year       INT,
    weekday    INT
);
";

const USERS_INSERT: &str = "
INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT DISTINCT
    userId     AS user_id,
    firstName  AS first_name,
    lastName   AS last_name,
    gender,
    level
FROM staging_events
WHERE userId IS NOT NULL;
";

const SONGS_INSERT: &str = "
INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT
    song_id,
    title,
    artist_id,
    year,
    duration
FROM staging_songs
WHERE song_id IS NOT NULL;
";

const ARTISTS_INSERT: &str = "
INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT
    artist_id,
    artist_name      AS name,
    artist_location  AS location,
    artist_latitude  AS latitude,
    artist_longitude AS longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;
";

const TIME_INSERT: &str = "
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT
    TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second' AS start_time,
    EXTRACT(hour FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second'),
    EXTRACT(day FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second'),
    EXTRACT(week FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second'),
    EXTRACT(month FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second'),
    EXTRACT(year FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second'),
    EXTRACT(weekday FROM TIMESTAMP 'epoch' + ts/1000 * INTERVAL '1 second')
FROM staging_events
WHERE ts IS NOT NULL;
";

// Only `NextSong` events are plays; songs match on title and artist name.
const SONGPLAYS_INSERT: &str = "
INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT
    TIMESTAMP 'epoch' + e.ts/1000 * INTERVAL '1 second' AS start_time,
    e.userId       AS user_id,
    e.level,
    s.song_id,
    s.artist_id,
    e.sessionId    AS session_id,
    e.location,
    e.userAgent    AS user_agent
FROM staging_events e
JOIN staging_songs s
  ON e.song = s.title AND e.artist = s.artist_name
WHERE e.page = 'NextSong';
";

/// `DROP TABLE IF EXISTS` for every table
pub fn drop_statements() -> Vec<Statement> {
    TABLES
        .into_iter()
        .map(|table| Statement::new(table, format!("DROP TABLE IF EXISTS {table};")))
        .collect()
}

/// `CREATE TABLE IF NOT EXISTS` for every table
pub fn create_statements() -> Vec<Statement> {
    let bodies = [
        STAGING_EVENTS_CREATE,
        STAGING_SONGS_CREATE,
        SONGPLAYS_CREATE,
        USERS_CREATE,
        SONGS_CREATE,
        ARTISTS_CREATE,
        TIME_CREATE,
    ];
    TABLES
        .into_iter()
        .zip(bodies)
        .map(|(table, sql)| Statement::new(table, sql))
        .collect()
}

fn copy_sql(table: &str, source: &str, role_arn: &str, region: &str, format: &str) -> String {
    format!(
        "
COPY {table} FROM '{source}'
CREDENTIALS 'aws_iam_role={role_arn}'
REGION '{region}'
FORMAT AS JSON '{format}';
"
    )
}

/// `COPY` from S3 into both staging tables.
///
/// Events are parsed with the JSONPaths file; songs map by column name.
pub fn copy_statements(sources: &S3Sources, role_arn: &str, region: &str) -> Vec<Statement> {
    vec![
        Statement::new(
            "staging_events",
            copy_sql(
                "staging_events",
                &sources.log_data,
                role_arn,
                region,
                &sources.log_jsonpath,
            ),
        ),
        Statement::new(
            "staging_songs",
            copy_sql("staging_songs", &sources.song_data, role_arn, region, "auto"),
        ),
    ]
}

/// Staging to star schema, dimensions before the fact table
pub fn insert_statements() -> Vec<Statement> {
    vec![
        Statement::new("users", USERS_INSERT),
        Statement::new("songs", SONGS_INSERT),
        Statement::new("artists", ARTISTS_INSERT),
        Statement::new("time", TIME_INSERT),
        Statement::new("songplays", SONGPLAYS_INSERT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> S3Sources {
        S3Sources {
            log_data: "s3://udacity-dend/log_data".to_string(),
            log_jsonpath: "s3://udacity-dend/log_json_path.json".to_string(),
            song_data: "s3://udacity-dend/song_data".to_string(),
        }
    }

    #[test]
    fn test_drop_and_create_cover_every_table() {
        let drops = drop_statements();
        let creates = create_statements();
        assert_eq!(drops.len(), 7);
        assert_eq!(creates.len(), 7);

        for ((drop, create), table) in drops.iter().zip(&creates).zip(TABLES) {
            assert_eq!(drop.sql, format!("DROP TABLE IF EXISTS {table};"));
            assert!(
                create
                    .sql
                    .contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
                "{} does not create {table}",
                create.name
            );
        }
    }

    #[test]
    fn test_copy_uses_role_region_and_jsonpath() {
        let copies = copy_statements(&sources(), "arn:aws:iam::123456789012:role/dwhRole", "eu-west-1");

        let events = &copies[0].sql;
        assert!(events.contains("COPY staging_events FROM 's3://udacity-dend/log_data'"));
        assert!(events.contains("CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(events.contains("REGION 'eu-west-1'"));
        assert!(events.contains("FORMAT AS JSON 's3://udacity-dend/log_json_path.json'"));

        let songs = &copies[1].sql;
        assert!(songs.contains("COPY staging_songs FROM 's3://udacity-dend/song_data'"));
        assert!(songs.contains("FORMAT AS JSON 'auto'"));
    }

    #[test]
    fn test_fact_table_loads_last() {
        let names: Vec<_> = insert_statements().iter().map(|s| s.name).collect();
        assert_eq!(names, ["users", "songs", "artists", "time", "songplays"]);
    }

    #[test]
    fn test_songplays_only_counts_next_song() {
        let songplays = insert_statements().pop().unwrap();
        assert!(songplays.sql.contains("WHERE e.page = 'NextSong'"));
    }
}
