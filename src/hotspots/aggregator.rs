//! Endpoint database profiles
//!
//! Walks controller action -> service -> repository, at most two hops, and
//! sums the DB touches of every method on the way.

use super::index::HotspotIndex;
use super::layers::LayerTagger;
use crate::models::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregated database activity behind one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDbProfile {
    /// `Controller.Action`
    pub endpoint: String,
    pub route: String,
    pub total_db_touches: usize,
    pub services: BTreeSet<String>,
    pub repositories: BTreeSet<String>,
    /// Inferred call paths in discovery order
    pub chains: Vec<String>,
}

impl EndpointDbProfile {
    /// Hotspot when the total exceeds `threshold`
    pub fn is_hotspot(&self, threshold: usize) -> bool {
        self.total_db_touches > threshold
    }
}

pub struct EndpointAggregator<'a> {
    index: &'a HotspotIndex,
    tagger: &'a dyn LayerTagger,
}

impl<'a> EndpointAggregator<'a> {
    pub fn new(index: &'a HotspotIndex, tagger: &'a dyn LayerTagger) -> Self {
        Self { index, tagger }
    }

    /// One profile per endpoint, in input order
    pub fn profile_all(&self, endpoints: &[Endpoint]) -> Vec<EndpointDbProfile> {
        endpoints.iter().map(|e| self.profile(e)).collect()
    }

    pub fn profile(&self, endpoint: &Endpoint) -> EndpointDbProfile {
        let index = self.index;
        let controller = endpoint.controller.as_str();
        let action = endpoint.action.as_str();
        let origin = endpoint.name();

        let mut total = index.db_touches(controller, action);
        let mut services = BTreeSet::new();
        let mut repositories = BTreeSet::new();
        let mut chains = Vec::new();

        for edge in index.calls(controller, action) {
            let target = edge.target_class.as_str();
            let role = index.role_of(target);

            if self.tagger.is_service(target, role) {
                services.insert(target.to_string());
                total += index.db_touches(target, &edge.target_method);

                let mut found_repository = false;
                for hop in index.calls(target, &edge.target_method) {
                    let repo = hop.target_class.as_str();
                    if !self.tagger.is_repository(repo, index.role_of(repo)) {
                        continue;
                    }
                    found_repository = true;
                    repositories.insert(repo.to_string());
                    total += index.db_touches(repo, &hop.target_method);
                    chains.push(format!("{origin} -> {} -> {}", edge.label(), hop.label()));
                }

                if !found_repository {
                    chains.push(format!("{origin} -> {}", edge.label()));
                }
            } else if self.tagger.is_repository(target, role) {
                repositories.insert(target.to_string());
                total += index.db_touches(target, &edge.target_method);
                chains.push(format!("{origin} -> {}", edge.label()));
            }
        }

        if chains.is_empty() {
            chains.push(format!(
                "{origin} (no downstream service/repository call inferred)"
            ));
        }

        EndpointDbProfile {
            endpoint: origin,
            route: if endpoint.route.is_empty() {
                "-".to_string()
            } else {
                endpoint.route.clone()
            },
            total_db_touches: total,
            services,
            repositories,
            chains,
        }
    }
}

/// Profiles above `threshold`, sorted by total DB touches descending.
/// Ties keep their input order.
pub fn select_hotspots(profiles: &[EndpointDbProfile], threshold: usize) -> Vec<EndpointDbProfile> {
    let mut hotspots: Vec<EndpointDbProfile> = profiles
        .iter()
        .filter(|p| p.is_hotspot(threshold))
        .cloned()
        .collect();
    hotspots.sort_by(|a, b| b.total_db_touches.cmp(&a.total_db_touches));
    hotspots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;
    use crate::hotspots::braces::BraceScan;
    use crate::hotspots::layers::NamingConventionTagger;

    fn build(files: Vec<(&str, &str)>) -> HotspotIndex {
        let provider = MockFileProvider::new(files);
        HotspotIndex::build(&provider, BraceScan::Naive)
    }

    fn endpoint(controller: &str, action: &str) -> Endpoint {
        let route = format!("/{}/{}", controller.replace("Controller", ""), action);
        Endpoint::new(controller, action, route)
    }

    const CONTROLLER: &str = r#"
public class UsersController : Controller
{
    private readonly IUserService _users;
    public ActionResult Details(int id)
    {
        var user = _users.GetUser(id);
        return View(user);
    }
    public ActionResult About()
    {
        return View();
    }
}
"#;

    const SERVICE: &str = r#"
public class UserService : IUserService
{
    private readonly IUserRepository _repo;
    public User GetUser(int id)
    {
        _audit_count++;
        return _repo.Load(id);
    }
}
"#;

    fn repository(body: &str) -> String {
        format!(
            "public class UserRepository : IUserRepository\n{{\n    private readonly AppDbContext _db;\n    public User Load(int id)\n    {{\n{body}\n    }}\n}}\n"
        )
    }

    #[test]
    fn test_no_downstream_call_uses_sentinel_chain() {
        let index = build(vec![("Controllers/UsersController.cs", CONTROLLER)]);
        let tagger = NamingConventionTagger;
        let profile = EndpointAggregator::new(&index, &tagger).profile(&endpoint("UsersController", "About"));

        assert_eq!(
            profile.chains,
            vec!["UsersController.About (no downstream service/repository call inferred)"]
        );
        assert_eq!(profile.total_db_touches, 0);
        assert!(profile.services.is_empty());
    }

    #[test]
    fn test_two_hop_chain_sums_and_flags_hotspot() {
        // Service's own body has one DB touch, repository has two
        let service = SERVICE.replace("_audit_count++;", "_ = _repo.Items.Any();");
        let repo = repository("        var all = _db.Users.ToList();\n        return _db.Users.Find(id);");
        let index = build(vec![
            ("Controllers/UsersController.cs", CONTROLLER),
            ("Services/UserService.cs", &service),
            ("Data/UserRepository.cs", &repo),
        ]);
        let tagger = NamingConventionTagger;
        let profile = EndpointAggregator::new(&index, &tagger).profile(&endpoint("UsersController", "Details"));

        assert_eq!(profile.total_db_touches, 3);
        assert!(profile.is_hotspot(1));
        assert_eq!(
            profile.chains,
            vec!["UsersController.Details -> UserService.GetUser -> UserRepository.Load"]
        );
        assert!(profile.services.contains("UserService"));
        assert!(profile.repositories.contains("UserRepository"));
        assert_eq!(profile.route, "/Users/Details");
    }

    #[test]
    fn test_repository_without_touches_is_not_hotspot() {
        let service = SERVICE.replace("_audit_count++;", "_ = _repo.Items.Any();");
        let repo = repository("        return null;");
        let index = build(vec![
            ("Controllers/UsersController.cs", CONTROLLER),
            ("Services/UserService.cs", &service),
            ("Data/UserRepository.cs", &repo),
        ]);
        let tagger = NamingConventionTagger;
        let profile = EndpointAggregator::new(&index, &tagger).profile(&endpoint("UsersController", "Details"));

        assert_eq!(profile.total_db_touches, 1);
        assert!(!profile.is_hotspot(1));
    }

    #[test]
    fn test_service_without_repository_gets_two_segment_chain() {
        let index = build(vec![
            ("Controllers/UsersController.cs", CONTROLLER),
            (
                "Services/UserService.cs",
                "public class UserService { public User GetUser(int id) { return null; } }",
            ),
        ]);
        let tagger = NamingConventionTagger;
        let profile = EndpointAggregator::new(&index, &tagger).profile(&endpoint("UsersController", "Details"));
        assert_eq!(profile.chains, vec!["UsersController.Details -> UserService.GetUser"]);
    }

    #[test]
    fn test_direct_repositories_fan_out_and_sum() {
        let controller = r#"
public class ReportsController : Controller
{
    private readonly IOrderRepository _orders;
    private readonly ICustomerRepository _customers;
    public ActionResult Index()
    {
        var a = _orders.All();
        var b = _customers.All();
        return View();
    }
}
"#;
        let index = build(vec![
            ("Controllers/ReportsController.cs", controller),
            (
                "Data/OrderRepository.cs",
                "public class OrderRepository { public List<Order> All() { return _db.Orders.ToList(); } }",
            ),
            (
                "Data/CustomerRepository.cs",
                "public class CustomerRepository { public List<Customer> All() { return _db.Customers.ToListAsync().Result; } }",
            ),
        ]);
        let tagger = NamingConventionTagger;
        let profile = EndpointAggregator::new(&index, &tagger).profile(&endpoint("ReportsController", "Index"));

        assert_eq!(profile.total_db_touches, 2);
        assert_eq!(
            profile.chains,
            vec![
                "ReportsController.Index -> OrderRepository.All",
                "ReportsController.Index -> CustomerRepository.All",
            ]
        );
        let repos: Vec<&str> = profile.repositories.iter().map(String::as_str).collect();
        assert_eq!(repos, vec!["CustomerRepository", "OrderRepository"]);
    }

    #[test]
    fn test_select_hotspots_sorts_descending_and_filters() {
        let make = |name: &str, total: usize| EndpointDbProfile {
            endpoint: name.to_string(),
            route: "-".to_string(),
            total_db_touches: total,
            services: BTreeSet::new(),
            repositories: BTreeSet::new(),
            chains: Vec::new(),
        };
        let profiles = vec![make("A", 2), make("B", 1), make("C", 5), make("D", 2)];
        let names: Vec<String> = select_hotspots(&profiles, 1)
            .into_iter()
            .map(|p| p.endpoint)
            .collect();
        assert_eq!(names, vec!["C", "A", "D"]);
    }
}
