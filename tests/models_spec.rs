use chrono::NaiveDate;
use museum_tours::models::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use speculate2::speculate;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date")
}

fn visit(id: &str, cost: Decimal) -> MuseumVisit {
    MuseumVisit::new(id, "Louvre", date(), cost).expect("valid visit")
}

speculate! {
    describe "construction validation" {
        it "rejects an empty city id" {
            assert_eq!(City::new("", "Paris"), Err(ModelError::EmptyId { entity: "city" }));
        }

        it "rejects a blank tour name" {
            assert_eq!(Tour::new("T1", "   "), Err(ModelError::EmptyName { entity: "tour" }));
        }

        it "rejects a negative visit cost" {
            let result = MuseumVisit::new("V1", "Louvre", date(), dec!(-1));
            assert_eq!(result, Err(ModelError::NegativeCost(dec!(-1))));
        }

        it "accepts a zero visit cost" {
            assert!(MuseumVisit::new("V1", "Louvre", date(), Decimal::ZERO).is_ok());
        }

        it "rejects an empty booking number" {
            assert_eq!(Member::new("M1", "Ada", ""), Err(ModelError::EmptyBookingNumber));
        }

        it "defaults the included-visits quota to two" {
            let member = Member::new("M1", "Ada", "BN-1").expect("valid member");
            assert_eq!(member.included_visits, 2);
        }
    }

    describe "city and visit pairing" {
        before {
            let mut city = City::new("C1", "Paris").expect("valid city");
            let mut v = visit("V1", dec!(20));
        }

        it "attaches a visit and sets its back-reference" {
            assert!(city.add_visit(&mut v));
            assert!(city.contains_visit("V1"));
            assert_eq!(v.city(), Some("C1"));
        }

        it "treats a duplicate attach as a no-op" {
            assert!(city.add_visit(&mut v));
            assert!(!city.add_visit(&mut v));
            assert_eq!(city.visits().len(), 1);
        }

        it "refuses a visit attached to a different city" {
            let mut other = City::new("C2", "Lyon").expect("valid city");
            assert!(other.add_visit(&mut v));

            assert!(!city.add_visit(&mut v));
            assert_eq!(v.city(), Some("C2"));
            assert!(!city.contains_visit("V1"));
        }

        it "detaches a visit and clears its back-reference" {
            city.add_visit(&mut v);
            assert!(city.remove_visit(&mut v));
            assert!(!city.contains_visit("V1"));
            assert_eq!(v.city(), None);
        }

        it "returns false when removing an absent visit" {
            assert!(!city.remove_visit(&mut v));
        }
    }

    describe "tour itinerary" {
        before {
            let mut tour = Tour::new("T1", "Grand Tour").expect("valid tour");
            let city = City::new("C1", "Paris").expect("valid city");
        }

        it "adds a city once" {
            assert!(tour.add_city(&city));
            assert!(!tour.add_city(&city));
            assert_eq!(tour.cities(), ["C1"]);
        }

        it "removes a city" {
            tour.add_city(&city);
            assert!(tour.remove_city(&city));
            assert!(!tour.contains_city("C1"));
            assert!(!tour.remove_city(&city));
        }
    }

    describe "tour membership" {
        before {
            let mut tour = Tour::new("T1", "Grand Tour").expect("valid tour");
            let mut member = Member::new("M1", "Ada", "BN-1").expect("valid member");
        }

        it "assigns a member and sets their back-reference" {
            assert!(tour.add_member(&mut member));
            assert!(tour.contains_member("M1"));
            assert_eq!(member.tour(), Some("T1"));
        }

        it "treats a duplicate assignment as a no-op" {
            tour.add_member(&mut member);
            assert!(!tour.add_member(&mut member));
            assert_eq!(tour.members().len(), 1);
        }

        it "refuses a member assigned to a different tour" {
            let mut other = Tour::new("T2", "Coastal Tour").expect("valid tour");
            other.add_member(&mut member);

            assert!(!tour.add_member(&mut member));
            assert_eq!(member.tour(), Some("T2"));
            assert!(!tour.contains_member("M1"));
        }

        it "unassigns a member and clears their back-reference" {
            tour.add_member(&mut member);
            assert!(tour.remove_member(&mut member));
            assert!(!tour.contains_member("M1"));
            assert_eq!(member.tour(), None);
        }

        it "returns false when removing a member who is not on the tour" {
            assert!(!tour.remove_member(&mut member));
            assert_eq!(member.tour(), None);
        }
    }

    describe "registration" {
        before {
            let mut tour = Tour::new("T1", "Grand Tour").expect("valid tour");
            let mut paris = City::new("C1", "Paris").expect("valid city");
            let mut member = Member::new("M1", "Ada", "BN-1").expect("valid member");
            tour.add_city(&paris);
            tour.add_member(&mut member);
            let mut v = visit("V1", dec!(20));
            paris.add_visit(&mut v);
        }

        it "registers a member for a visit in a tour city" {
            assert!(v.register_member(&mut member, Some(&tour)));
            assert!(v.is_registered("M1"));
            assert!(member.is_registered_for("V1"));
        }

        it "treats a duplicate registration as a no-op" {
            v.register_member(&mut member, Some(&tour));
            assert!(!v.register_member(&mut member, Some(&tour)));
            assert_eq!(v.registered_members().len(), 1);
            assert_eq!(member.registered_visits().len(), 1);
        }

        it "refuses a visit in a city the tour does not include" {
            let mut lyon = City::new("C2", "Lyon").expect("valid city");
            let mut elsewhere = visit("V2", dec!(15));
            lyon.add_visit(&mut elsewhere);

            assert!(!elsewhere.register_member(&mut member, Some(&tour)));
            assert!(elsewhere.registered_members().is_empty());
            assert!(!member.is_registered_for("V2"));
        }

        it "refuses an orphaned visit" {
            let mut orphan = visit("V3", dec!(15));
            assert!(!orphan.register_member(&mut member, Some(&tour)));
            assert!(orphan.registered_members().is_empty());
        }

        it "refuses a member without a tour" {
            let mut loner = Member::new("M2", "Grace", "BN-2").expect("valid member");
            assert!(!v.register_member(&mut loner, None));
            assert!(!v.is_registered("M2"));
        }

        it "unregisters from both sides" {
            v.register_member(&mut member, Some(&tour));
            assert!(v.unregister_member(&mut member));
            assert!(!v.is_registered("M1"));
            assert!(!member.is_registered_for("V1"));
        }

        it "returns false when unregistering an absent member" {
            assert!(!v.unregister_member(&mut member));
        }
    }

    describe "additional cost" {
        before {
            let member = Member::new("M1", "Ada", "BN-1").expect("valid member");
        }

        it "is zero at or under the quota" {
            assert_eq!(member.additional_cost(vec![]), Decimal::ZERO);
            assert_eq!(member.additional_cost(vec![dec!(40), dec!(25)]), Decimal::ZERO);
        }

        it "covers the most expensive visits and bills the rest" {
            // Quota 2: the 30 and 20 are free, the 10 is billed.
            let costs = vec![dec!(10), dec!(30), dec!(20)];
            assert_eq!(member.additional_cost(costs), dec!(10));
        }

        it "bills everything beyond the quota on ties" {
            let costs = vec![dec!(5), dec!(5), dec!(5), dec!(5)];
            assert_eq!(member.additional_cost(costs), dec!(10));
        }

        it "bills every visit when the quota is zero" {
            let mut member = member;
            member.included_visits = 0;
            assert_eq!(member.additional_cost(vec![dec!(10), dec!(20)]), dec!(30));
        }
    }

    describe "visit revenue" {
        it "multiplies the cost by the roster size" {
            let mut tour = Tour::new("T1", "Grand Tour").expect("valid tour");
            let mut paris = City::new("C1", "Paris").expect("valid city");
            tour.add_city(&paris);
            let mut v = visit("V1", dec!(12.50));
            paris.add_visit(&mut v);

            for (id, bn) in [("M1", "BN-1"), ("M2", "BN-2")] {
                let mut member = Member::new(id, "Traveler", bn).expect("valid member");
                tour.add_member(&mut member);
                assert!(v.register_member(&mut member, Some(&tour)));
            }
            assert_eq!(v.total_revenue(), dec!(25.00));
        }
    }
}
