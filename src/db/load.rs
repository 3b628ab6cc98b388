use sqlx::PgPool;

use crate::model::{ArmyKind, World};

/// Load an entire world snapshot into Postgres using COPY FROM STDIN (text
/// format).
///
/// Order respects FK constraints: users → lands → buildings/units/tasks.
pub async fn load_world(pool: &PgPool, world: &World) -> Result<(), sqlx::Error> {
    // Users
    {
        let mut buf = String::new();
        for (id, user) in &world.users {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                id,
                user.quacks,
                user.quack_streak,
                escape(&user.quack_rank),
                user.quackerinos,
                escape(&user.species),
                opt_u64(user.liege_id),
                opt_u64(user.homeland_id),
                user.safety_count,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_users.sql"), &buf).await?;
    }

    // Lands (before their buildings and units due to FK)
    {
        let mut buf = String::new();
        for (id, land) in &world.lands {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                id,
                escape(&land.name),
                land.owner_id,
                escape(&land.species),
                land.quality,
                land.max_quality,
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_lands.sql"), &buf).await?;
    }

    // Buildings, positional
    {
        let mut buf = String::new();
        for (id, land) in &world.lands {
            for (position, name) in land.buildings.iter().enumerate() {
                buf.push_str(&format!("{}\t{}\t{}\n", id, position, escape(name)));
            }
        }
        copy_in(pool, include_str!("../../sql/copy_buildings.sql"), &buf).await?;
    }

    // Units, both armies
    {
        let mut buf = String::new();
        for (id, land) in &world.lands {
            for (kind, army) in [
                (ArmyKind::Garrison, &land.garrison),
                (ArmyKind::SiegeCamp, &land.siege_camp),
            ] {
                let army_name = match kind {
                    ArmyKind::Garrison => "garrison",
                    ArmyKind::SiegeCamp => "siege_camp",
                };
                for unit in &army.0 {
                    buf.push_str(&format!(
                        "{}\t{}\t{}\t{}\t{}\n",
                        id,
                        army_name,
                        escape(&unit.troop_name),
                        unit.owner_id,
                        unit.amount,
                    ));
                }
            }
        }
        copy_in(pool, include_str!("../../sql/copy_units.sql"), &buf).await?;
    }

    // Pending tasks
    {
        let mut buf = String::new();
        for task in &world.config.task_queue {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                task.user_id,
                task.kind.name(),
                escape(&task.item),
                task.location_id,
                task.amount,
                task.time_remaining,
                opt_u64(task.target_land_id),
            ));
        }
        copy_in(pool, include_str!("../../sql/copy_tasks.sql"), &buf).await?;
    }

    Ok(())
}

/// Execute a COPY FROM STDIN with the given text-format payload.
async fn copy_in(pool: &PgPool, statement: &str, data: &str) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let mut copy = conn.copy_in_raw(statement).await?;
    copy.send(data.as_bytes()).await?;
    copy.finish().await?;
    Ok(())
}

/// Escape a string for Postgres COPY text format.
/// Backslash must be escaped first, then the special whitespace characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Render an optional id as a COPY text value (`\N` for NULL).
fn opt_u64(v: Option<u64>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "\\N".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_copy_specials() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("tab\there"), "tab\\there");
        assert_eq!(escape("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn optional_ids_render_null_markers() {
        assert_eq!(opt_u64(Some(7)), "7");
        assert_eq!(opt_u64(None), "\\N");
    }
}
