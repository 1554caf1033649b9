/// Builds and parses resource hrefs of the form `<base>/api/<collection>/<id>[/<sub>/<id>]`.
#[derive(Debug, Clone)]
pub struct Hrefs {
    api_root: String,
}

/// Resource an href points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Instance(u64),
    CustomAttribute { instance_id: u64, id: u64 },
}

impl Hrefs {
    pub fn new(base_url: &str) -> Self {
        Self {
            api_root: format!("{}/api", base_url.trim_end_matches('/')),
        }
    }

    pub fn instance(&self, id: u64) -> String {
        format!("{}/instances/{}", self.api_root, id)
    }

    pub fn custom_attributes(&self, instance_id: u64) -> String {
        format!("{}/custom_attributes", self.instance(instance_id))
    }

    pub fn custom_attribute(&self, instance_id: u64, id: u64) -> String {
        format!("{}/{}", self.custom_attributes(instance_id), id)
    }

    pub fn load_balancers(&self, instance_id: u64) -> String {
        format!("{}/load_balancers", self.instance(instance_id))
    }

    pub fn load_balancer(&self, instance_id: u64, id: u64) -> String {
        format!("{}/{}", self.load_balancers(instance_id), id)
    }

    pub fn task(&self, id: u64) -> String {
        format!("{}/tasks/{}", self.api_root, id)
    }

    /// Parse an absolute or relative href. Host and base are not checked; only
    /// the path below `/api/` matters.
    pub fn parse(href: &str) -> Option<ResourceRef> {
        let path = href.split(['?', '#']).next().unwrap_or_default();
        let rest = match path.find("/api/") {
            Some(idx) => &path[idx + "/api/".len()..],
            None => path.trim_start_matches('/'),
        };

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["instances", id] => Some(ResourceRef::Instance(id.parse().ok()?)),
            ["instances", instance_id, "custom_attributes", id] => {
                Some(ResourceRef::CustomAttribute {
                    instance_id: instance_id.parse().ok()?,
                    id: id.parse().ok()?,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_nested_hrefs() {
        let hrefs = Hrefs::new("http://localhost:3000/");
        assert_eq!(hrefs.instance(5), "http://localhost:3000/api/instances/5");
        assert_eq!(
            hrefs.custom_attribute(5, 9),
            "http://localhost:3000/api/instances/5/custom_attributes/9"
        );
        assert_eq!(
            hrefs.load_balancer(5, 2),
            "http://localhost:3000/api/instances/5/load_balancers/2"
        );
        assert_eq!(hrefs.task(77), "http://localhost:3000/api/tasks/77");
    }

    #[test]
    fn test_parses_what_it_builds() {
        let hrefs = Hrefs::new("http://example.com");
        assert_eq!(
            Hrefs::parse(&hrefs.instance(3)),
            Some(ResourceRef::Instance(3))
        );
        assert_eq!(
            Hrefs::parse(&hrefs.custom_attribute(3, 4)),
            Some(ResourceRef::CustomAttribute {
                instance_id: 3,
                id: 4
            })
        );
    }

    #[test]
    fn test_parses_relative_hrefs() {
        assert_eq!(
            Hrefs::parse("instances/12"),
            Some(ResourceRef::Instance(12))
        );
        assert_eq!(
            Hrefs::parse("/api/instances/12?expand=resources"),
            Some(ResourceRef::Instance(12))
        );
    }

    #[test]
    fn test_rejects_foreign_or_malformed_hrefs() {
        assert_eq!(Hrefs::parse("http://h/api/vms/1"), None);
        assert_eq!(Hrefs::parse("http://h/api/instances/abc"), None);
        assert_eq!(Hrefs::parse("http://h/api/instances"), None);
        assert_eq!(Hrefs::parse("http://h/api/instances/1/load_balancers/2"), None);
        assert_eq!(Hrefs::parse("http://h/api/tasks/8"), None);
        assert_eq!(Hrefs::parse(""), None);
    }
}
