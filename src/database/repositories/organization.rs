//! Cluster, team and team member repository

use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use crate::models::organization::{Cluster, Team, TeamMember};
use crate::utils::errors::CampHubError;

#[derive(Clone, Debug)]
pub struct OrganizationRepository {
    pool: PgPool,
}

/// Add a team member unless they are already on the team
async fn ensure_team_member(
    tx: &mut Transaction<'_, Postgres>,
    team_id: i64,
    user_id: i64,
) -> Result<(), CampHubError> {
    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, joined_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (team_id, user_id) DO NOTHING
        "#
    )
    .bind(team_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Clusters

    pub async fn create_cluster(
        &self,
        camp_id: i64,
        name: &str,
        description: Option<String>,
        cluster_lead_id: Option<i64>,
    ) -> Result<Cluster, CampHubError> {
        let now = Utc::now();
        let cluster = sqlx::query_as::<_, Cluster>(
            r#"
            INSERT INTO clusters (camp_id, name, description, cluster_lead_id, enable_cluster_lead, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#
        )
        .bind(camp_id)
        .bind(name)
        .bind(description)
        .bind(cluster_lead_id)
        .bind(cluster_lead_id.is_some())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Cluster name already used in this camp"))?;

        Ok(cluster)
    }

    pub async fn find_cluster(&self, id: i64) -> Result<Option<Cluster>, CampHubError> {
        let cluster = sqlx::query_as::<_, Cluster>("SELECT * FROM clusters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(cluster)
    }

    pub async fn get_cluster(&self, id: i64) -> Result<Cluster, CampHubError> {
        self.find_cluster(id)
            .await?
            .ok_or(CampHubError::ClusterNotFound { cluster_id: id })
    }

    pub async fn list_clusters(&self, camp_id: i64) -> Result<Vec<Cluster>, CampHubError> {
        let clusters = sqlx::query_as::<_, Cluster>(
            "SELECT * FROM clusters WHERE camp_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(camp_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clusters)
    }

    /// Whether another cluster in the camp already uses `name`
    pub async fn cluster_name_taken(&self, camp_id: i64, name: &str, except_id: Option<i64>) -> Result<bool, CampHubError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM clusters
                WHERE camp_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#
        )
        .bind(camp_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Persist every mutable column of the cluster
    pub async fn save_cluster(&self, cluster: &Cluster) -> Result<Cluster, CampHubError> {
        let saved = sqlx::query_as::<_, Cluster>(
            r#"
            UPDATE clusters
            SET name = $2, description = $3, cluster_lead_id = $4, backup_cluster_lead_id = $5,
                enable_cluster_lead = $6, enable_backup_cluster_lead = $7, updated_at = $8
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(cluster.id)
        .bind(&cluster.name)
        .bind(&cluster.description)
        .bind(cluster.cluster_lead_id)
        .bind(cluster.backup_cluster_lead_id)
        .bind(cluster.enable_cluster_lead)
        .bind(cluster.enable_backup_cluster_lead)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Cluster name already used in this camp"))?;

        saved.ok_or(CampHubError::ClusterNotFound { cluster_id: cluster.id })
    }

    /// Deleting a cluster cascades to its teams and their members
    pub async fn delete_cluster(&self, id: i64) -> Result<(), CampHubError> {
        let result = sqlx::query("DELETE FROM clusters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CampHubError::ClusterNotFound { cluster_id: id });
        }
        Ok(())
    }

    // Teams

    /// Create a team; a lead given up front also becomes a team member
    pub async fn create_team(
        &self,
        cluster_id: i64,
        name: &str,
        description: Option<String>,
        team_lead_id: Option<i64>,
    ) -> Result<Team, CampHubError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (cluster_id, name, description, team_lead_id, enable_team_lead, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#
        )
        .bind(cluster_id)
        .bind(name)
        .bind(description)
        .bind(team_lead_id)
        .bind(team_lead_id.is_some())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Team name already used in this cluster"))?;

        if let Some(lead_id) = team_lead_id {
            ensure_team_member(&mut tx, team.id, lead_id).await?;
        }

        tx.commit().await?;
        Ok(team)
    }

    pub async fn find_team(&self, id: i64) -> Result<Option<Team>, CampHubError> {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(team)
    }

    pub async fn get_team(&self, id: i64) -> Result<Team, CampHubError> {
        self.find_team(id)
            .await?
            .ok_or(CampHubError::TeamNotFound { team_id: id })
    }

    pub async fn list_teams(&self, cluster_id: i64) -> Result<Vec<Team>, CampHubError> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT * FROM teams WHERE cluster_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(cluster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    pub async fn team_name_taken(&self, cluster_id: i64, name: &str, except_id: Option<i64>) -> Result<bool, CampHubError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM teams
                WHERE cluster_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#
        )
        .bind(cluster_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Persist the team; whoever holds a lead slot is added as a member in the same transaction
    pub async fn save_team(&self, team: &Team) -> Result<Team, CampHubError> {
        let mut tx = self.pool.begin().await?;

        let saved = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET cluster_id = $2, name = $3, description = $4, team_lead_id = $5, backup_team_lead_id = $6,
                enable_team_lead = $7, enable_backup_team_lead = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(team.id)
        .bind(team.cluster_id)
        .bind(&team.name)
        .bind(&team.description)
        .bind(team.team_lead_id)
        .bind(team.backup_team_lead_id)
        .bind(team.enable_team_lead)
        .bind(team.enable_backup_team_lead)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| CampHubError::from_insert(e, "Team name already used in this cluster"))?
        .ok_or(CampHubError::TeamNotFound { team_id: team.id })?;

        for lead_id in [saved.team_lead_id, saved.backup_team_lead_id].into_iter().flatten() {
            ensure_team_member(&mut tx, saved.id, lead_id).await?;
        }

        tx.commit().await?;
        Ok(saved)
    }

    pub async fn delete_team(&self, id: i64) -> Result<(), CampHubError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CampHubError::TeamNotFound { team_id: id });
        }
        Ok(())
    }

    // Team members

    pub async fn find_team_member(&self, team_id: i64, user_id: i64) -> Result<Option<TeamMember>, CampHubError> {
        let member = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE team_id = $1 AND user_id = $2"
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn add_team_member(&self, team_id: i64, user_id: i64) -> Result<TeamMember, CampHubError> {
        let member = sqlx::query_as::<_, TeamMember>(
            "INSERT INTO team_members (team_id, user_id, joined_at) VALUES ($1, $2, $3) RETURNING *"
        )
        .bind(team_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CampHubError::from_insert(e, "User is already on this team"))?;

        Ok(member)
    }

    pub async fn remove_team_member(&self, team_id: i64, user_id: i64) -> Result<(), CampHubError> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CampHubError::TeamMemberNotFound { team_id, user_id });
        }
        Ok(())
    }

    pub async fn list_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>, CampHubError> {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM team_members WHERE team_id = $1 ORDER BY joined_at ASC, id ASC"
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
