use std::fmt;

use gtfs_io_model::{
    Agency, Attribution, Calendar, CalendarDate, FareAttribute, FareRule, FeedInfo, Frequency,
    GroupedEntity, Level, Pathway, Route, Shape, Stop, StopTime, Transfer, Trip, UniqueEntity,
};

use crate::collection::{EntityCollection, ListCollection, UniqueCollection, UniqueEntityCollection};

/// All entities of one GTFS feed.
///
/// Collections are boxed so a host can back any of them with its own storage.
pub struct Feed {
    pub feed_info: Option<FeedInfo>,
    pub agencies: Box<dyn UniqueEntityCollection<Agency>>,
    pub stops: Box<dyn UniqueEntityCollection<Stop>>,
    pub routes: Box<dyn UniqueEntityCollection<Route>>,
    pub trips: Box<dyn UniqueEntityCollection<Trip>>,
    pub stop_times: Box<dyn EntityCollection<StopTime>>,
    pub calendars: Box<dyn EntityCollection<Calendar>>,
    pub calendar_dates: Box<dyn EntityCollection<CalendarDate>>,
    pub fare_attributes: Box<dyn EntityCollection<FareAttribute>>,
    pub fare_rules: Box<dyn UniqueEntityCollection<FareRule>>,
    pub shapes: Box<dyn EntityCollection<Shape>>,
    pub frequencies: Box<dyn EntityCollection<Frequency>>,
    pub transfers: Box<dyn EntityCollection<Transfer>>,
    pub levels: Box<dyn UniqueEntityCollection<Level>>,
    pub pathways: Box<dyn UniqueEntityCollection<Pathway>>,
    pub attributions: Box<dyn EntityCollection<Attribution>>,
}

impl Feed {
    /// Empty feed backed by in-memory collections.
    pub fn new() -> Self {
        Self {
            feed_info: None,
            agencies: Box::new(UniqueCollection::new()),
            stops: Box::new(UniqueCollection::new()),
            routes: Box::new(UniqueCollection::new()),
            trips: Box::new(UniqueCollection::new()),
            stop_times: Box::new(ListCollection::new()),
            calendars: Box::new(ListCollection::new()),
            calendar_dates: Box::new(ListCollection::new()),
            fare_attributes: Box::new(ListCollection::new()),
            fare_rules: Box::new(UniqueCollection::new()),
            shapes: Box::new(ListCollection::new()),
            frequencies: Box::new(ListCollection::new()),
            transfers: Box::new(ListCollection::new()),
            levels: Box::new(UniqueCollection::new()),
            pathways: Box::new(UniqueCollection::new()),
            attributions: Box::new(ListCollection::new()),
        }
    }

    /// Appends every entity of this feed to `target`, without any key checks.
    pub fn copy_to(&self, target: &mut Feed) {
        if let Some(feed_info) = &self.feed_info {
            target.feed_info = Some(feed_info.clone());
        }
        target.agencies.add_range(self.agencies.get().cloned().collect());
        target.stops.add_range(self.stops.get().cloned().collect());
        target.routes.add_range(self.routes.get().cloned().collect());
        target.trips.add_range(self.trips.get().cloned().collect());
        target.stop_times.add_range(self.stop_times.get().cloned().collect());
        target.calendars.add_range(self.calendars.get().cloned().collect());
        target
            .calendar_dates
            .add_range(self.calendar_dates.get().cloned().collect());
        target
            .fare_attributes
            .add_range(self.fare_attributes.get().cloned().collect());
        target.fare_rules.add_range(self.fare_rules.get().cloned().collect());
        target.shapes.add_range(self.shapes.get().cloned().collect());
        target
            .frequencies
            .add_range(self.frequencies.get().cloned().collect());
        target.transfers.add_range(self.transfers.get().cloned().collect());
        target.levels.add_range(self.levels.get().cloned().collect());
        target.pathways.add_range(self.pathways.get().cloned().collect());
        target
            .attributions
            .add_range(self.attributions.get().cloned().collect());
    }

    /// Merges `other` into this feed.
    ///
    /// Keyed entities from `other` replace entities with the same key. Grouped
    /// entities are added unless an equal entity already exists in the group.
    /// Feed info from `other`, when present, replaces ours.
    pub fn merge(&mut self, other: &Feed) {
        if let Some(feed_info) = &other.feed_info {
            self.feed_info = Some(feed_info.clone());
        }
        merge_unique(self.agencies.as_mut(), other.agencies.as_ref());
        merge_unique(self.stops.as_mut(), other.stops.as_ref());
        merge_unique(self.routes.as_mut(), other.routes.as_ref());
        merge_unique(self.trips.as_mut(), other.trips.as_ref());
        merge_grouped(self.stop_times.as_mut(), other.stop_times.as_ref());
        merge_grouped(self.calendars.as_mut(), other.calendars.as_ref());
        merge_grouped(self.calendar_dates.as_mut(), other.calendar_dates.as_ref());
        merge_grouped(self.fare_attributes.as_mut(), other.fare_attributes.as_ref());
        merge_unique(self.fare_rules.as_mut(), other.fare_rules.as_ref());
        merge_grouped(self.shapes.as_mut(), other.shapes.as_ref());
        merge_grouped(self.frequencies.as_mut(), other.frequencies.as_ref());
        merge_grouped(self.transfers.as_mut(), other.transfers.as_ref());
        merge_unique(self.levels.as_mut(), other.levels.as_ref());
        merge_unique(self.pathways.as_mut(), other.pathways.as_ref());
        merge_grouped(self.attributions.as_mut(), other.attributions.as_ref());
    }

    /// Total number of entities, feed info included.
    pub fn entity_count(&self) -> usize {
        usize::from(self.feed_info.is_some())
            + self.agencies.count()
            + self.stops.count()
            + self.routes.count()
            + self.trips.count()
            + self.stop_times.len()
            + self.calendars.len()
            + self.calendar_dates.len()
            + self.fare_attributes.len()
            + self.fare_rules.count()
            + self.shapes.len()
            + self.frequencies.len()
            + self.transfers.len()
            + self.levels.count()
            + self.pathways.count()
            + self.attributions.len()
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("feed_info", &self.feed_info)
            .field("agencies", &self.agencies.count())
            .field("stops", &self.stops.count())
            .field("routes", &self.routes.count())
            .field("trips", &self.trips.count())
            .field("stop_times", &self.stop_times.len())
            .field("calendars", &self.calendars.len())
            .field("calendar_dates", &self.calendar_dates.len())
            .field("fare_attributes", &self.fare_attributes.len())
            .field("fare_rules", &self.fare_rules.count())
            .field("shapes", &self.shapes.len())
            .field("frequencies", &self.frequencies.len())
            .field("transfers", &self.transfers.len())
            .field("levels", &self.levels.count())
            .field("pathways", &self.pathways.count())
            .field("attributions", &self.attributions.len())
            .finish()
    }
}

fn merge_unique<T>(target: &mut dyn UniqueEntityCollection<T>, source: &dyn UniqueEntityCollection<T>)
where
    T: UniqueEntity + Clone,
{
    target.replace_range(source.get().cloned().collect());
}

fn merge_grouped<T>(target: &mut dyn EntityCollection<T>, source: &dyn EntityCollection<T>)
where
    T: GroupedEntity + Clone + PartialEq,
{
    for entity in source.get() {
        let present = target
            .get_by_key(entity.group_key())
            .any(|existing| existing == entity);
        if !present {
            target.add(entity.clone());
        }
    }
}
