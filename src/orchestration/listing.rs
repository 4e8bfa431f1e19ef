//! Read-only dump of every open request, for the `requests` command.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::ColonyGateway;
use crate::models::{Building, Citizen, Colony, Request, Requester};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestListing {
    pub colonies: Vec<ColonyRequests>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonyRequests {
    pub colony: Colony,
    pub building_requests: Vec<(Building, Request)>,
    pub citizen_requests: Vec<(Citizen, Request)>,
}

impl RequestListing {
    pub fn total(&self) -> usize {
        self.colonies
            .iter()
            .map(|c| c.building_requests.len() + c.citizen_requests.len())
            .sum()
    }
}

/// Walk every colony and collect building and citizen requests. Only an
/// unreadable colony list fails the whole listing.
pub async fn collect_requests(gateway: &dyn ColonyGateway) -> Result<RequestListing> {
    let mut listing = RequestListing::default();

    for colony in gateway.colonies().await? {
        let mut entry = ColonyRequests {
            colony: colony.clone(),
            building_requests: Vec::new(),
            citizen_requests: Vec::new(),
        };

        match gateway.buildings(&colony).await {
            Ok(buildings) => {
                for building in buildings.into_iter().filter(|b| b.is_requester) {
                    match gateway.requests_for_building(&colony, &building).await {
                        Ok(requests) => entry
                            .building_requests
                            .extend(requests.into_iter().map(|r| (building.clone(), r))),
                        Err(e) => debug!(building = %building, error = %e, "Building requests unreadable"),
                    }
                }
            }
            Err(e) => debug!(colony = %colony, error = %e, "Buildings unreadable"),
        }

        match gateway.citizens(&colony).await {
            Ok(citizens) => {
                for citizen in citizens {
                    match gateway.requests_for_citizen(&colony, &citizen).await {
                        Ok(requests) => entry
                            .citizen_requests
                            .extend(requests.into_iter().map(|r| (citizen.clone(), r))),
                        Err(e) => debug!(citizen = %citizen, error = %e, "Citizen requests unreadable"),
                    }
                }
            }
            Err(e) => debug!(colony = %colony, error = %e, "Citizens unreadable"),
        }

        for (_, request) in &entry.building_requests {
            log_request_details(&colony, request);
        }
        for (_, request) in &entry.citizen_requests {
            log_request_details(&colony, request);
        }

        listing.colonies.push(entry);
    }

    info!(total = listing.total(), "Total open requests found");
    Ok(listing)
}

fn log_request_details(colony: &Colony, request: &Request) {
    let requester = match &request.requester {
        Some(Requester::Building(id)) => format!("building #{id}"),
        Some(Requester::Citizen(id)) => format!("citizen #{id}"),
        Some(Requester::Other(kind)) => kind.clone(),
        None => "?".to_string(),
    };
    let item = request
        .display_stacks
        .first()
        .map(|s| s.display_name())
        .unwrap_or_else(|| "?".to_string());

    info!(
        colony = %colony,
        request_id = request.id,
        state = %request.state,
        item = %item,
        requester = %requester,
        deliverable = request.requestable.deliverable_count().is_some(),
        "Open request"
    );
}
