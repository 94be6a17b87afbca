//! Technical-footprint sub-analysis over an organization's public repositories.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use startupintel_shared::{CompanyRecord, GithubAnalysis, RepoMetadata, RepoSummary};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::{OrgIdentity, OrgResolver, RepoFetcher};
use crate::lexicon::{
    ML_HIGH_VALUE_TERMS, ML_REPO_INDICATORS, PRIMARY_ML_LANGUAGE, SECONDARY_ML_LANGUAGES,
    contains_any, count_terms,
};

/// Window for "recent" activity.
pub const RECENT_ACTIVITY_DAYS: i64 = 30;

/// Popularity threshold for a high-visibility project.
const VISIBLE_STARS: u32 = 50;
const VISIBLE_FORKS: u32 = 10;

fn repo_text(repo: &RepoMetadata) -> String {
    format!(
        "{} {}",
        repo.name,
        repo.description.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

fn is_recent(repo: &RepoMetadata, now: DateTime<Utc>) -> bool {
    repo.updated_at
        .is_some_and(|t| now - t < Duration::days(RECENT_ACTIVITY_DAYS))
}

fn language_is(repo: &RepoMetadata, lang: &str) -> bool {
    repo.language
        .as_deref()
        .is_some_and(|l| l.eq_ignore_ascii_case(lang))
}

/// Whether the ML vocabulary matches the repository's name or description.
pub fn is_ml_repository(repo: &RepoMetadata) -> bool {
    let text = repo_text(repo);
    contains_any(&text, ML_REPO_INDICATORS) || contains_any(&text, ML_HIGH_VALUE_TERMS)
}

/// Per-repository ML relevance in [0, 10], used to order ML repositories.
pub fn score_repository(repo: &RepoMetadata, now: DateTime<Utc>) -> f64 {
    let text = repo_text(repo);
    let mut score = count_terms(&text, ML_REPO_INDICATORS) as f64;
    score += 2.0 * count_terms(&text, ML_HIGH_VALUE_TERMS) as f64;

    if language_is(repo, PRIMARY_ML_LANGUAGE) {
        score += 1.0;
    } else if SECONDARY_ML_LANGUAGES
        .iter()
        .any(|lang| language_is(repo, lang))
    {
        score += 0.5;
    }

    if repo.stars > 100 {
        score += 1.0;
    }
    if repo.stars > 1000 {
        score += 1.0;
    }
    if is_recent(repo, now) {
        score += 0.5;
    }

    score.min(10.0)
}

fn summarize(repo: &RepoMetadata, ml_score: f64) -> RepoSummary {
    RepoSummary {
        name: repo.name.clone(),
        description: repo.description.clone(),
        language: repo.language.clone(),
        stars: repo.stars,
        forks: repo.forks,
        updated_at: repo.updated_at,
        ml_score,
        url: repo.html_url.clone(),
    }
}

/// Build the footprint report for a resolved organization.
pub fn analyze_repositories(
    org: &OrgIdentity,
    repos: &[RepoMetadata],
    now: DateTime<Utc>,
) -> GithubAnalysis {
    let mut analysis = GithubAnalysis::not_found(now);
    analysis.organization_found = true;
    analysis.organization_name = Some(org.login.clone());
    analysis.total_repositories = repos.len();

    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    for repo in repos {
        if let Some(lang) = &repo.language {
            *languages.entry(lang.clone()).or_default() += 1;
        }
        if language_is(repo, PRIMARY_ML_LANGUAGE) {
            analysis.python_repositories += 1;
        }
        if !is_ml_repository(repo) {
            continue;
        }

        analysis.ml_related_repos += 1;
        if is_recent(repo, now) {
            analysis.recent_ml_activity = true;
        }
        let summary = summarize(repo, score_repository(repo, now));
        if repo.stars > VISIBLE_STARS || repo.forks > VISIBLE_FORKS {
            analysis.open_source_ml_projects.push(summary.clone());
        }
        analysis.ml_repositories.push(summary);
    }

    analysis
        .ml_repositories
        .sort_by(|a, b| b.ml_score.total_cmp(&a.ml_score));
    analysis
        .open_source_ml_projects
        .sort_by(|a, b| b.stars.cmp(&a.stars));
    analysis.languages_used = languages;
    analysis.ml_contributions_score = footprint_score(&analysis);
    analysis
}

/// Footprint score in [0, 10]. Zero when no organization was found.
pub fn footprint_score(analysis: &GithubAnalysis) -> u8 {
    if !analysis.organization_found {
        return 0;
    }

    let mut score = 2.0;
    if analysis.total_repositories > 0 {
        let total = analysis.total_repositories as f64;
        score += (analysis.ml_related_repos as f64 / total * 10.0).min(3.0);
        score += (analysis.python_repositories as f64 / total * 4.0).min(2.0);
    }
    score += (analysis.open_source_ml_projects.len() as f64 * 0.5).min(2.0);
    if analysis.recent_ml_activity {
        score += 1.0;
    }

    (score as u8).min(10)
}

/// Resolve the company's organization and analyze its repositories.
///
/// Never fails. Resolver errors count as "no organization found". A repository
/// fetch error yields [`GithubAnalysis::unavailable`], which the composite
/// scores like a missing organization.
#[instrument(skip_all, fields(company = %record.name))]
pub async fn technical_footprint(
    resolver: &dyn OrgResolver,
    fetcher: &dyn RepoFetcher,
    record: &CompanyRecord,
    now: DateTime<Utc>,
) -> GithubAnalysis {
    let org = match resolver.resolve(record).await {
        Ok(Some(org)) => org,
        Ok(None) => {
            debug!("no organization found");
            return GithubAnalysis::not_found(now);
        }
        Err(e) => {
            warn!(error = %e, "organization lookup failed, treating as not found");
            return GithubAnalysis::not_found(now);
        }
    };

    let repos = match fetcher.fetch_repos(&org).await {
        Ok(repos) => repos,
        Err(e) => {
            warn!(org = %org.login, error = %e, "repository listing failed, default footprint");
            return GithubAnalysis::unavailable(&org.login, e.to_string(), now);
        }
    };

    let analysis = analyze_repositories(&org, &repos, now);
    info!(
        org = %org.login,
        repos = analysis.total_repositories,
        ml_repos = analysis.ml_related_repos,
        score = analysis.ml_contributions_score,
        "footprint analyzed"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedOrg, FixedRepos};

    fn repo(name: &str, description: &str, language: &str) -> RepoMetadata {
        RepoMetadata {
            name: name.into(),
            description: Some(description.into()),
            language: Some(language.into()),
            stars: 0,
            forks: 0,
            updated_at: None,
            html_url: None,
        }
    }

    #[test]
    fn flags_ml_repositories_by_name_and_description() {
        assert!(is_ml_repository(&repo("pytorch-models", "", "Python")));
        assert!(is_ml_repository(&repo("vision", "Computer vision toolkit", "C++")));
        assert!(!is_ml_repository(&repo("website", "Marketing site", "TypeScript")));
        // Language alone does not flag a repository
        assert!(!is_ml_repository(&repo("scripts", "ops scripts", "Python")));
    }

    #[test]
    fn repository_score_combines_terms_language_popularity() {
        let now = Utc::now();
        let mut r = repo("nlp-pytorch", "Deep learning for NLP", "Python");
        r.stars = 1500;
        r.updated_at = Some(now - Duration::days(3));
        // indicators: pytorch (1); high-value: deep learning, pytorch, nlp (6);
        // python (1); stars (2); recent (0.5)
        assert_eq!(score_repository(&r, now), 10.0);

        let plain = repo("tool", "a cli", "Go");
        assert_eq!(score_repository(&plain, now), 0.0);
    }

    #[test]
    fn analysis_counts_and_orders() {
        let now = Utc::now();
        let mut popular = repo("tensorflow-serving-fork", "model serving", "Python");
        popular.stars = 80;
        popular.updated_at = Some(now - Duration::days(5));
        let mut forked = repo("pandas-utils", "", "Python");
        forked.forks = 20;
        forked.stars = 10;
        let repos = vec![
            popular,
            forked,
            repo("website", "", "TypeScript"),
            repo("infra", "terraform", "HCL"),
        ];

        let analysis = analyze_repositories(&OrgIdentity::new("acme"), &repos, now);

        assert!(analysis.organization_found);
        assert_eq!(analysis.organization_name.as_deref(), Some("acme"));
        assert_eq!(analysis.total_repositories, 4);
        assert_eq!(analysis.python_repositories, 2);
        assert_eq!(analysis.ml_related_repos, 2);
        assert!(analysis.recent_ml_activity);
        assert_eq!(analysis.open_source_ml_projects.len(), 2);
        assert_eq!(analysis.open_source_ml_projects[0].name, "tensorflow-serving-fork");
        assert_eq!(analysis.languages_used.get("Python"), Some(&2));
        // 2 + min(3, 0.5*10) + min(2, 0.5*4) + min(2, 2*0.5) + 1 = 9
        assert_eq!(analysis.ml_contributions_score, 9);
    }

    #[test]
    fn present_but_empty_org_scores_base() {
        let analysis = analyze_repositories(&OrgIdentity::new("acme"), &[], Utc::now());
        assert_eq!(analysis.ml_contributions_score, 2);
    }

    #[test]
    fn stale_activity_is_not_recent() {
        let now = Utc::now();
        let mut r = repo("keras-models", "", "Python");
        r.updated_at = Some(now - Duration::days(45));
        let analysis = analyze_repositories(&OrgIdentity::new("acme"), &[r], now);
        assert!(!analysis.recent_ml_activity);
    }

    #[tokio::test]
    async fn unresolved_org_is_not_found_with_zero_score() {
        let record = CompanyRecord::new("Acme", "test");
        let analysis =
            technical_footprint(&FixedOrg(None), &FixedRepos::ok(vec![]), &record, Utc::now())
                .await;
        assert!(!analysis.organization_found);
        assert_eq!(analysis.ml_contributions_score, 0);
    }

    #[tokio::test]
    async fn repo_fetch_failure_keeps_org_with_error_noted() {
        let record = CompanyRecord::new("Acme", "test");
        let analysis = technical_footprint(
            &FixedOrg(Some("acme".into())),
            &FixedRepos::failing("HTTP 403 rate limit exceeded"),
            &record,
            Utc::now(),
        )
        .await;
        assert!(analysis.organization_found);
        assert_eq!(analysis.organization_name.as_deref(), Some("acme"));
        assert_eq!(analysis.total_repositories, 0);
        assert!(!analysis.is_scorable());
        assert!(analysis.fetch_error.as_deref().is_some_and(|e| e.contains("HTTP 403")));
    }
}
